//! Server handle type.

use crate::error::server::ServerError;
use crate::server::registry::ConnectionRegistry;

use common::ErrorLocation;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::Location;

use log::info;
use tokio::task::JoinHandle;

/// Handle to a running server.
///
/// Returned by [`start_server`](crate::server::start_server). Dropping the handle
/// does **not** stop the server; call [`shutdown`](Self::shutdown) to stop
/// accepting. Sessions already running are unaffected and end when their
/// clients disconnect.
pub struct ServerHandle {
    local_addr: SocketAddr,
    registry: ConnectionRegistry,
    accept_task: JoinHandle<Infallible>,
}

impl ServerHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        registry: ConnectionRegistry,
        accept_task: JoinHandle<Infallible>,
    ) -> Self {
        Self {
            local_addr,
            registry,
            accept_task,
        }
    }

    /// Address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Stop accepting new connections.
    pub fn shutdown(&self) {
        info!("Stopping listener on {}", self.local_addr);
        self.accept_task.abort();
    }

    /// Wait for the accept loop. Under normal operation this never returns.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] once the accept loop has been aborted or has panicked.
    pub async fn wait(self) -> Result<Infallible, ServerError> {
        match self.accept_task.await {
            Ok(never) => match never {},
            Err(e) => Err(ServerError::Io {
                message: format!("Accept loop stopped: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
