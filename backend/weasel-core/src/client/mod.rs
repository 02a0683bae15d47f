//! Minimal TLS WebSocket client for the weasel protocol.
//!
//! Mirrors what browser clients do: JSON text frames, optional "compressed"
//! binary frames produced with [`codec::encode`], and heartbeats carrying the
//! client clock so the round trip can be measured from the echoed timestamp.
//! Reconnection and offline queueing are left to the application.

use crate::codec;
use crate::error::client::ClientError;
use crate::message::{HEARTBEAT_TAG, TYPE_FIELD};
use crate::response::ACK_SUFFIX;
use crate::server::tls::load_certificates;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::{SinkExt, StreamExt};
use log::debug;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::crypto::ring::default_provider;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{WebSocketStream, client_async};

pub type ClientStream = WebSocketStream<TlsStream<TcpStream>>;

pub struct WeaselClient {
    ws: ClientStream,
}

impl WeaselClient {
    /// Connect to `wss://{host}:{port}`, trusting only the certificates in `root_cert_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Tls`] if the root certificate cannot be loaded or the
    /// server's certificate is not trusted, [`ClientError::Connect`] if the TCP
    /// connection fails, and [`ClientError::Handshake`] if the WebSocket upgrade fails.
    pub async fn connect(
        host: &str,
        port: u16,
        root_cert_path: &Path,
    ) -> Result<Self, ClientError> {
        let connector = tls_connector(root_cert_path)?;
        let server_name =
            ServerName::try_from(host.to_string()).map_err(|e| ClientError::Tls {
                message: format!("Invalid server name {host}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let tcp = TcpStream::connect((host, port)).await?;
        let tls = connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| ClientError::Tls {
                message: format!("TLS handshake failed: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let url = format!("wss://{host}:{port}");
        let (ws, _) = client_async(url.as_str(), tls)
            .await
            .map_err(|e| ClientError::Handshake {
                message: format!("WebSocket handshake with {url} failed: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Connected to {url}");
        Ok(Self { ws })
    }

    /// Send a JSON message as a text frame.
    ///
    /// Objects without a usable `id` get one: the current Unix time in
    /// milliseconds. See [`with_message_id`].
    pub async fn send(&mut self, message: Value) -> Result<(), ClientError> {
        let text = serde_json::to_string(&with_message_id(message))?;
        self.send_frame(WsMessage::Text(text.into())).await
    }

    /// Send a JSON message as a transformed binary frame. Same `id` rule as [`send`](Self::send).
    pub async fn send_compressed(&mut self, message: Value) -> Result<(), ClientError> {
        let text = serde_json::to_string(&with_message_id(message))?;
        self.send_frame(WsMessage::Binary(codec::encode(&text).into()))
            .await
    }

    /// Send text exactly as given.
    pub async fn send_raw_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.send_frame(WsMessage::Text(text.to_string().into()))
            .await
    }

    /// Send bytes exactly as given.
    pub async fn send_raw_binary(&mut self, data: Vec<u8>) -> Result<(), ClientError> {
        self.send_frame(WsMessage::Binary(data.into())).await
    }

    /// Send a heartbeat stamped with the current time. Returns the timestamp sent.
    pub async fn heartbeat(&mut self) -> Result<u64, ClientError> {
        let timestamp = now_millis();
        let heartbeat = json!({ TYPE_FIELD: HEARTBEAT_TAG, "timestamp": timestamp });
        self.send_raw_text(&heartbeat.to_string()).await?;
        Ok(timestamp)
    }

    /// Send a heartbeat and wait for its acknowledgement.
    ///
    /// Latency is measured against the timestamp the server echoes back.
    pub async fn measure_latency(&mut self) -> Result<Duration, ClientError> {
        self.heartbeat().await?;
        let response = self.recv_response().await?;

        let expected = format!("{HEARTBEAT_TAG}{ACK_SUFFIX}");
        if response.get(TYPE_FIELD).and_then(Value::as_str) != Some(expected.as_str()) {
            return Err(ClientError::Decode {
                message: format!("Expected {expected}, got {response}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let sent = response
            .get("timestamp")
            .and_then(Value::as_u64)
            .ok_or_else(|| ClientError::Decode {
                message: format!("{expected} has no numeric timestamp"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Duration::from_millis(now_millis().saturating_sub(sent)))
    }

    /// Wait for the next response and parse it as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] if the server closed the connection.
    pub async fn recv_response(&mut self) -> Result<Value, ClientError> {
        loop {
            let frame = match self.ws.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    return Err(ClientError::Read {
                        message: e.to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                None => {
                    return Err(ClientError::Closed {
                        message: String::from("Connection closed by server"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            match frame {
                WsMessage::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
                WsMessage::Binary(data) => return Ok(serde_json::from_slice(&data)?),
                WsMessage::Close(_) => {
                    return Err(ClientError::Closed {
                        message: String::from("Server sent close frame"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            }
        }
    }

    /// Like [`recv_response`](Self::recv_response), but `Ok(None)` if nothing arrives within `wait`.
    pub async fn recv_response_timeout(
        &mut self,
        wait: Duration,
    ) -> Result<Option<Value>, ClientError> {
        match tokio::time::timeout(wait, self.recv_response()).await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Close the connection with a normal close frame.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.ws.close(None).await.map_err(|e| ClientError::Send {
            message: format!("Failed to close: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Drop the TCP connection without a close handshake.
    pub fn abort(self) {
        drop(self.ws);
    }

    async fn send_frame(&mut self, frame: WsMessage) -> Result<(), ClientError> {
        self.ws.send(frame).await.map_err(|e| ClientError::Send {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn tls_connector(root_cert_path: &Path) -> Result<TlsConnector, ClientError> {
    let certificates = load_certificates(root_cert_path).map_err(|e| ClientError::Tls {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let mut roots = RootCertStore::empty();
    for certificate in certificates {
        roots.add(certificate).map_err(|e| ClientError::Tls {
            message: format!("Rejected root certificate: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
    }

    let config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientError::Tls {
            message: format!("Failed to select protocol versions: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Fill in `id` on objects whose `id` is missing or falsy (`null`, `false`, `0`, `""`).
pub fn with_message_id(mut message: Value) -> Value {
    if let Value::Object(fields) = &mut message {
        if fields.get("id").is_none_or(is_falsy) {
            fields.insert(String::from("id"), Value::from(now_millis()));
        }
    }
    message
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
