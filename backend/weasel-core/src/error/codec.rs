use common::ErrorLocation;

use std::panic::Location;
use std::str::Utf8Error;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransformError {
    #[error("Transform Error: {message} {location}")]
    InvalidUtf8 {
        message: String,
        location: ErrorLocation,
    },
}

impl From<Utf8Error> for TransformError {
    #[track_caller]
    fn from(error: Utf8Error) -> Self {
        TransformError::InvalidUtf8 {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
