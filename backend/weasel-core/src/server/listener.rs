use crate::config::ServerConfig;
use crate::error::server::ServerError;
use crate::error::transport::TransportError;
use crate::server::handle::ServerHandle;
use crate::server::registry::ConnectionRegistry;
use crate::server::session::Session;
use crate::server::tls;

use common::ErrorLocation;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::Location;
use std::time::Duration;

use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::server::TlsStream;
use tokio_tungstenite::{WebSocketStream, accept_async};

/// Pause after a failed `accept()` so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Starts the secure WebSocket server.
///
/// Loads the TLS credentials named in `config`, binds `config.bind_address()`
/// and spawns the accept loop in the background.
///
/// # Returns
///
/// Returns [`ServerHandle`] on success, representing the running server.
///
/// # Errors
///
/// - [`ServerError::Credential`] - certificate or key missing or unusable
/// - [`ServerError::Bind`] - address in use, permission denied, unresolvable host
pub async fn start_server(
    config: &ServerConfig,
    registry: ConnectionRegistry,
) -> Result<ServerHandle, ServerError> {
    let acceptor = tls::load_acceptor(&config.tls.cert_path, &config.tls.key_path)?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| ServerError::Bind {
            address: address.clone(),
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
    let local_addr = listener.local_addr()?;

    info!("WebSocket server started on wss://{}", local_addr);

    let accept_task = TokioSpawn(accept_loop(listener, acceptor, registry.clone()));

    Ok(ServerHandle::new(local_addr, registry, accept_task))
}

/// Start the server and wait on it. Does not return under normal operation.
///
/// # Errors
///
/// Startup errors as for [`start_server`], or [`ServerError::Io`] if the accept
/// loop stops.
pub async fn serve(
    config: &ServerConfig,
    registry: ConnectionRegistry,
) -> Result<Infallible, ServerError> {
    start_server(config, registry).await?.wait().await
}

async fn accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    registry: ConnectionRegistry,
) -> Infallible {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("Client connecting from {}", addr);
                TokioSpawn(handle_connection(
                    stream,
                    addr,
                    acceptor.clone(),
                    registry.clone(),
                ));
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
}

/// Handles a single accepted socket: TLS, WebSocket upgrade, then the session.
///
/// Errors end here. A failed handshake means the session never started and
/// nothing was registered; a failed session has already unregistered itself.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    acceptor: TlsAcceptor,
    registry: ConnectionRegistry,
) {
    let ws_stream = match upgrade(stream, acceptor).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            warn!("Rejected connection from {}: {}", addr, e);
            return;
        }
    };

    let session = Session::new(ws_stream, addr, registry);
    let id = session.id();

    match session.run().await {
        Ok(()) => info!("Connection closed: {} ({})", addr, id),
        Err(e) => warn!("Connection closed: {} ({}) - {}", addr, id, e),
    }
}

async fn upgrade(
    stream: TcpStream,
    acceptor: TlsAcceptor,
) -> Result<WebSocketStream<TlsStream<TcpStream>>, TransportError> {
    let tls_stream = acceptor
        .accept(stream)
        .await
        .map_err(|e| TransportError::Tls {
            message: format!("TLS handshake failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    accept_async(tls_stream)
        .await
        .map_err(|e| TransportError::Handshake {
            message: format!("WebSocket handshake failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
