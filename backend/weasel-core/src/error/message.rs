use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// The inbound text is not well-formed JSON.
#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error("Decode Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },
}

impl From<serde_json::Error> for DecodeError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        DecodeError::Json {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Well-formed JSON that does not carry what the dispatch table needs.
#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("Schema Error: {message} {location}")]
    NotAnObject {
        message: String,
        location: ErrorLocation,
    },

    #[error("Schema Error: {message} {location}")]
    MissingType {
        message: String,
        location: ErrorLocation,
    },

    #[error("Schema Error: {message} {location}")]
    InvalidType {
        message: String,
        location: ErrorLocation,
    },

    #[error("Schema Error: {message} {location}")]
    MissingField {
        message: String,
        location: ErrorLocation,
    },
}

/// Any reason a single frame is dropped without a response.
#[derive(Debug, ThisError)]
pub enum FrameError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
