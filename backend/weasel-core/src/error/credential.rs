use common::ErrorLocation;

use std::path::PathBuf;

use thiserror::Error as ThisError;

/// The certificate/key pair could not be turned into a TLS acceptor.
#[derive(Debug, ThisError)]
pub enum CredentialError {
    #[error("Certificate Error: {path}: {message} {location}")]
    Certificate {
        path: PathBuf,
        message: String,
        location: ErrorLocation,
    },

    #[error("Private Key Error: {path}: {message} {location}")]
    PrivateKey {
        path: PathBuf,
        message: String,
        location: ErrorLocation,
    },

    #[error("TLS Config Error: {message} {location}")]
    Tls {
        message: String,
        location: ErrorLocation,
    },
}
