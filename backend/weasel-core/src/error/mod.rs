pub mod client;
pub mod codec;
pub mod config;
pub mod credential;
pub mod message;
pub mod registry;
pub mod server;
pub mod transport;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Credential(#[from] credential::CredentialError),

    #[error(transparent)]
    Server(#[from] server::ServerError),

    #[error(transparent)]
    Transport(#[from] transport::TransportError),

    #[error(transparent)]
    Client(#[from] client::ClientError),
}
