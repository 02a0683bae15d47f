use crate::error::WeaselError;

use weasel_core::error::config::ConfigError;
use weasel_core::error::server::ServerError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies config failures keep the core message when surfaced by the binary.
///
/// **WHY THIS MATTERS**: The binary prints exactly one line before exiting; losing the
/// core reason (which file, which field) leaves the operator guessing.
#[test]
fn given_config_error_when_converted_then_keeps_reason() {
    let core = ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: String::from("listen.host cannot be empty"),
    };

    let err = WeaselError::from(core);

    assert!(matches!(err, WeaselError::Config { .. }));
    let text = err.to_string();
    assert!(text.starts_with("Config Error:"), "{text}");
    assert!(text.contains("listen.host cannot be empty"), "{text}");
}

#[test]
fn given_server_error_when_converted_then_maps_to_server_variant() {
    let core = ServerError::Bind {
        address: String::from("localhost:8765"),
        message: String::from("Address already in use"),
        location: ErrorLocation::from(Location::caller()),
    };

    let err: WeaselError = core.into();

    assert!(matches!(err, WeaselError::Server { .. }));
    assert!(err.to_string().contains("localhost:8765"));
}

/// **VALUE**: Verifies the location recorded is where the binary converted the error.
#[test]
fn given_conversion_when_question_mark_used_then_location_is_call_site() {
    fn fail() -> Result<(), WeaselError> {
        let core = ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
            reason: String::from("no home"),
        };
        Err::<(), _>(core)?;
        Ok(())
    }

    let err = fail().unwrap_err();

    assert!(err.to_string().contains(file!()), "{err}");
}
