//! Where the server looks for its config file and writes its log.

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::env;
use std::ffi::OsString;
use std::panic::Location;
use std::path::PathBuf;

pub const CONFIG_DIR_ENV: &str = "WEASEL_CONFIG_DIR";
const APP_DIR_NAME: &str = "weasel";
const LOG_DIR_NAME: &str = "logs";

/// Outcome of [`load_dotenv`].
///
/// `load_dotenv` runs before the logger exists, so it logs nothing; the caller
/// reports it once logging is up.
#[derive(Debug, Default)]
pub struct EnvLoadResult {
    /// `.env` file that was loaded, if any.
    pub path: Option<PathBuf>,
    /// A `.env` file that exists but could not be parsed.
    pub error: Option<(PathBuf, String)>,
}

/// Load `.env` from the working directory, or failing that from next to the executable.
pub fn load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        return EnvLoadResult {
            path: Some(path),
            error: None,
        };
    }

    let Some(env_path) = env::current_exe()
        .ok()
        .and_then(|exe_path| exe_path.parent().map(|dir| dir.join(".env")))
    else {
        return EnvLoadResult::default();
    };
    if !env_path.exists() {
        return EnvLoadResult::default();
    }

    match dotenvy::from_path(&env_path) {
        Ok(_) => EnvLoadResult {
            path: Some(env_path),
            error: None,
        },
        Err(e) => EnvLoadResult {
            path: None,
            error: Some((env_path, e.to_string())),
        },
    }
}

/// Resolve the config directory.
///
/// 1. `WEASEL_CONFIG_DIR`
/// 2. `{platform config dir}/weasel` (e.g. `~/.config/weasel` on Linux)
pub fn resolve_config_dir() -> Result<PathBuf, ConfigError> {
    resolve_config_dir_from(env::var_os(CONFIG_DIR_ENV), dirs::config_dir())
}

/// [`resolve_config_dir`] with its inputs supplied by the caller.
pub fn resolve_config_dir_from(
    override_dir: Option<OsString>,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(custom_dir) = override_dir.filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(custom_dir));
    }

    if let Some(config_dir) = platform_dir {
        return Ok(config_dir.join(APP_DIR_NAME));
    }

    Err(ConfigError::DirectoryNotFound {
        location: ErrorLocation::from(Location::caller()),
        reason: format!("Cannot determine config directory. Set {CONFIG_DIR_ENV}."),
    })
}

/// Default log directory: `{platform data dir}/weasel/logs`, else `./logs`.
pub fn default_log_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(data_dir) => data_dir.join(APP_DIR_NAME).join(LOG_DIR_NAME),
        None => PathBuf::from(LOG_DIR_NAME),
    }
}
