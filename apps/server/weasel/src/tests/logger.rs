// Unit tests for logger initialization
// Tests focus on idempotence and error handling

use crate::logger::{LOG_FILE_NAME, initialize, initialize_internal, is_installed};

use std::path::PathBuf;

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when trying to set a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable log directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path(), LevelFilter::Debug);
    let result2 = initialize(temp_dir.path(), LevelFilter::Debug);

    // THEN: Both return Ok and a logger is installed
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(result2.is_ok(), "Second initialization should be a no-op");
    assert!(is_installed());
    assert!(temp_dir.path().join(LOG_FILE_NAME).exists());
}

/// **VALUE**: Verifies that an unusable log directory is an error, not a panic.
///
/// **WHY THIS MATTERS**: A log directory on a read-only or missing mount must stop
/// startup with a clear message.
#[test]
fn given_invalid_log_dir_when_initializing_then_returns_logger_error() {
    // GIVEN: A path under a file, which can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch directly (bypasses the once-only guard)
    let result = initialize_internal(&invalid_dir, LevelFilter::Info);

    // THEN: Logger error naming the file
    let err = result.expect_err("Should fail for invalid log directory");
    let err_string = err.to_string();
    assert!(err_string.starts_with("Logger Error:"), "{err_string}");
    assert!(err_string.contains(LOG_FILE_NAME), "{err_string}");
}
