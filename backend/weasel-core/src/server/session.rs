//! One client's receive/respond loop.
//!
//! A [`Session`] owns its WebSocket for the whole connection. Frames are
//! handled strictly in arrival order, one at a time:
//!
//! 1. Binary frames are run through [`codec::decode`]; text frames are used as-is
//! 2. The text is decoded into an envelope and classified
//! 3. The acknowledgement is serialized and written back on the same socket
//!
//! A frame that fails any step before the write is logged and dropped. The
//! client gets no reply and the session keeps reading. Only the transport
//! ending (close, disconnect, read or write failure) ends the session.

use crate::codec;
use crate::error::message::FrameError;
use crate::error::transport::TransportError;
use crate::message;
use crate::response::{self, Response};
use crate::server::registry::{ConnectionId, ConnectionRegistry};
use crate::server::session_state::{SessionLifecycle, SessionState};

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Decode one frame's text and build its acknowledgement.
///
/// # Errors
///
/// Returns [`FrameError::Decode`] for malformed JSON and [`FrameError::Schema`]
/// when the message has no usable `type` or lacks a required field.
pub fn dispatch(text: &str) -> Result<Response, FrameError> {
    let envelope = message::decode(text)?;
    let response = response::build(envelope)?;
    Ok(response)
}

/// Serialized acknowledgement for one frame's text, or `None` if the frame is dropped.
///
/// Every per-frame failure (malformed JSON, bad schema, unencodable response)
/// is logged here and never reaches the session loop.
pub(crate) fn reply_for(text: &str, peer: SocketAddr) -> Option<String> {
    let response = match dispatch(text) {
        Ok(response) => response,
        Err(FrameError::Decode(e)) => {
            warn!("Received invalid JSON from {peer}: {e}");
            return None;
        }
        Err(FrameError::Schema(e)) => {
            warn!("Error handling message from {peer}: {e}");
            return None;
        }
    };

    match response.to_json() {
        Ok(reply) => Some(reply),
        Err(e) => {
            let error = TransportError::Encode {
                message: format!("Failed to encode {}: {e}", response.kind()),
                location: ErrorLocation::from(Location::caller()),
            };
            warn!("Dropping reply to {peer}: {error}");
            None
        }
    }
}

pub struct Session<S> {
    id: ConnectionId,
    peer: SocketAddr,
    ws: WebSocketStream<S>,
    registry: ConnectionRegistry,
    lifecycle: SessionLifecycle,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(ws: WebSocketStream<S>, peer: SocketAddr, registry: ConnectionRegistry) -> Self {
        Self::with_id(ConnectionId::new(), ws, peer, registry)
    }

    pub fn with_id(
        id: ConnectionId,
        ws: WebSocketStream<S>,
        peer: SocketAddr,
        registry: ConnectionRegistry,
    ) -> Self {
        Self {
            id,
            peer,
            ws,
            registry,
            lifecycle: SessionLifecycle::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    /// Run the session to completion.
    ///
    /// The connection is unregistered before this returns, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the connection ended abnormally. A clean
    /// close (close frame or end of stream) returns `Ok(())`.
    pub async fn run(mut self) -> Result<(), TransportError> {
        match self.registry.register(self.id).await {
            Ok(_) => {
                self.lifecycle.activate();
                info!("Client {} connected as {}", self.peer, self.id);
            }
            Err(e) => error!("Failed to register connection {}: {}", self.id, e),
        }

        let outcome = if self.lifecycle.state() == SessionState::Active {
            self.receive_loop().await
        } else {
            Ok(())
        };

        self.lifecycle.begin_close();
        self.cleanup().await;

        outcome
    }

    async fn receive_loop(&mut self) -> Result<(), TransportError> {
        while let Some(frame) = self.ws.next().await {
            let frame = frame.map_err(|e| TransportError::Read {
                message: format!("Error reading from {}: {e}", self.peer),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let text = match frame {
                WsMessage::Text(text) => text.as_str().to_owned(),
                WsMessage::Binary(data) => match codec::decode(&data) {
                    Some(text) => text,
                    None => {
                        debug!("Dropping undecodable binary frame from {}", self.peer);
                        continue;
                    }
                },
                WsMessage::Close(close_frame) => {
                    debug!("Client {} sent close: {:?}", self.peer, close_frame);
                    continue;
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            };

            if let Some(reply) = reply_for(&text, self.peer) {
                self.send_reply(reply).await?;
            }
        }

        Ok(())
    }

    async fn send_reply(&mut self, reply: String) -> Result<(), TransportError> {
        self.ws
            .send(WsMessage::Text(reply.into()))
            .await
            .map_err(|e| TransportError::Send {
                message: format!("Failed to send to {}: {e}", self.peer),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn cleanup(&mut self) {
        match self.registry.unregister(self.id).await {
            Ok(true) => debug!("Connection {} removed from registry", self.id),
            Ok(false) => debug!("Connection {} was not registered", self.id),
            Err(e) => error!("Failed to unregister connection {}: {}", self.id, e),
        }
        self.lifecycle.finish();
        info!("Client {} disconnected ({})", self.peer, self.id);
    }
}
