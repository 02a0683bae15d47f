use weasel_core::error::config::ConfigError;
use weasel_core::error::server::ServerError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the server process.
///
/// Core errors are flattened to their message so the binary reports them the
/// same way regardless of origin; the location is where the binary saw them.
#[derive(Debug, Error)]
pub enum WeaselError {
    /// Logger could not be installed
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Config directory, file, or log directory problem
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Server failed to start or its accept loop stopped
    #[error("Server Error: {message} {location}")]
    Server {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ConfigError> for WeaselError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        WeaselError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ServerError> for WeaselError {
    #[track_caller]
    fn from(error: ServerError) -> Self {
        WeaselError::Server {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
