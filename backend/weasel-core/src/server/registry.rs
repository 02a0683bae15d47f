//! Registry of live connections using the actor pattern.
//!
//! The registry only records membership: a connection is a member from the
//! moment its session starts until the moment it has fully terminated. It never
//! owns or closes a connection.
//!
//! # Architecture
//!
//! - Mutations are [`RegistryCommand`]s sent over an mpsc channel
//! - A dedicated task applies them one at a time
//! - Each command carries a oneshot reply, so `register`/`unregister` return
//!   only once the set has actually changed
//! - Reads go through `Arc<RwLock<_>>` and never queue behind the actor

use crate::error::registry::RegistryError;

use common::ErrorLocation;

use std::collections::HashSet;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};
use uuid::Uuid;

const COMMAND_BUFFER: usize = 100;

/// Identity assigned to a connection when the transport accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commands that mutate the registry.
///
/// The reply is `true` when the set changed.
#[derive(Debug)]
pub enum RegistryCommand {
    Register {
        id: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
    Unregister {
        id: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
}

/// Handle to the process-wide set of active connections.
///
/// `Clone` is cheap and every clone shares the same set. Created once by the
/// caller and injected into the listener, which hands a clone to each session.
#[derive(Clone)]
pub struct ConnectionRegistry {
    /// Sender to the actor, created on first mutation
    command_tx: Arc<Mutex<Option<mpsc::Sender<RegistryCommand>>>>,

    /// Shared read-only view of the members
    members: Arc<RwLock<HashSet<ConnectionId>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    ///
    /// The actor is spawned lazily on first use, so this can be called outside
    /// a Tokio runtime.
    pub fn new() -> Self {
        Self {
            command_tx: Arc::new(Mutex::new(None)),
            members: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Add a connection. Returns `false` if it was already a member.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] if the actor has stopped.
    pub async fn register(&self, id: ConnectionId) -> Result<bool, RegistryError> {
        let (reply, reply_rx) = oneshot::channel();
        self.submit(RegistryCommand::Register { id, reply }, reply_rx)
            .await
    }

    /// Remove a connection.
    ///
    /// Removing a connection that is not a member is a no-op that returns
    /// `false`, so overlapping cleanup paths are harmless.
    pub async fn unregister(&self, id: ConnectionId) -> Result<bool, RegistryError> {
        let (reply, reply_rx) = oneshot::channel();
        self.submit(RegistryCommand::Unregister { id, reply }, reply_rx)
            .await
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.members.read().await.contains(&id)
    }

    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Point-in-time copy of the members.
    pub async fn snapshot(&self) -> Vec<ConnectionId> {
        self.members.read().await.iter().copied().collect()
    }

    async fn submit(
        &self,
        cmd: RegistryCommand,
        reply_rx: oneshot::Receiver<bool>,
    ) -> Result<bool, RegistryError> {
        let tx = self.sender().await;

        tx.send(cmd).await.map_err(|e| RegistryError::Unavailable {
            message: format!("Registry actor died: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        reply_rx.await.map_err(|e| RegistryError::Unavailable {
            message: format!("Registry actor dropped reply: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Sender to the actor, spawning it on first call.
    async fn sender(&self) -> mpsc::Sender<RegistryCommand> {
        let mut tx_guard = self.command_tx.lock().await;
        if let Some(tx) = tx_guard.as_ref() {
            return tx.clone();
        }

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(registry_actor(rx, Arc::clone(&self.members)));
        *tx_guard = Some(tx.clone());
        info!("Connection registry actor spawned");
        tx
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The registry actor task.
///
/// Owns all writes to the member set. Runs until every registry handle has
/// been dropped.
async fn registry_actor(
    mut command_rx: mpsc::Receiver<RegistryCommand>,
    members: Arc<RwLock<HashSet<ConnectionId>>>,
) {
    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            RegistryCommand::Register { id, reply } => {
                let mut members_write = members.write().await;
                let inserted = members_write.insert(id);
                if inserted {
                    debug!(
                        "Registered connection {id} ({} active)",
                        members_write.len()
                    );
                } else {
                    warn!("Connection {id} registered twice");
                }
                drop(members_write);
                let _ = reply.send(inserted);
            }
            RegistryCommand::Unregister { id, reply } => {
                let mut members_write = members.write().await;
                let removed = members_write.remove(&id);
                if removed {
                    debug!(
                        "Unregistered connection {id} ({} active)",
                        members_write.len()
                    );
                } else {
                    debug!("Connection {id} already unregistered");
                }
                drop(members_write);
                let _ = reply.send(removed);
            }
        }
    }

    debug!("Connection registry actor stopped");
}
