//! Secure WebSocket server.
//!
//! The server:
//!
//! - Terminates TLS with a pre-provisioned certificate/key pair
//! - Upgrades each TLS stream to a WebSocket
//! - Runs one [`Session`] task per connection
//! - Tracks live connections in a [`ConnectionRegistry`]
//!
//! # Lifecycle
//!
//! A session registers itself before reading its first frame and unregisters
//! itself on every exit path: graceful close, abrupt disconnect, or read/write
//! failure. Malformed frames never end a session; they are logged and dropped
//! without a reply.

mod handle;
mod listener;
pub mod registry;
pub mod session;
pub(crate) mod session_state;
pub mod tls;

pub use handle::ServerHandle;
pub use listener::{serve, start_server};
pub use registry::{ConnectionId, ConnectionRegistry};
pub use session::{Session, dispatch};
pub use session_state::SessionState;
