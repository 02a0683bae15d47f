//! Console + `weasel.log` logging for the server binary.

use crate::error::WeaselError;

use common::ErrorLocation;

use std::fmt::Arguments;
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();
static INIT_ATTEMPTED: AtomicBool = AtomicBool::new(false);
static INSTALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "weasel.log";

/// Install the global logger at `level`, writing to stdout and `{log_dir}/weasel.log`.
///
/// Only the first call does anything. Later calls warn and return Ok, even if
/// the first one failed.
///
/// # Errors
///
/// Returns [`WeaselError::Logger`] if the log file cannot be created or a
/// global logger is already set.
pub fn initialize(log_dir: &Path, level: LevelFilter) -> Result<(), WeaselError> {
    if INIT_ATTEMPTED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());
    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir, level);
        if result.is_ok() {
            INSTALLED.store(true, Ordering::SeqCst);
            info!("Logger initialized at level {level}, writing {LOG_FILE_NAME}");
        }
    });
    result
}

/// Whether log records currently go anywhere.
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

#[track_caller]
pub(crate) fn initialize_internal(log_dir: &Path, level: LevelFilter) -> Result<(), WeaselError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = fern::log_file(&log_file_path).map_err(|e| WeaselError::Logger {
        message: format!("Failed to create log file {}: {e}", log_file_path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let console = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, colors.color(record.level()), message, record)
        })
        .chain(stdout());

    let file = Dispatch::new()
        .format(|out, message, record| write_line(out, record.level(), message, record))
        .chain(log_file);

    Dispatch::new()
        .level(level)
        .chain(console)
        .chain(file)
        .apply()
        .map_err(|e| WeaselError::Logger {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// `[<rfc3339> - LEVEL] message [target]`
fn write_line(
    out: FormatCallback,
    level: impl std::fmt::Display,
    message: &Arguments,
    record: &Record,
) {
    out.finish(format_args!(
        "[{} - {}] {} [{}]",
        format_rfc3339(SystemTime::now()),
        level,
        message,
        record.target()
    ))
}
