use weasel::error::WeaselError;
use weasel::logger::{initialize as LoggerInitialize, is_installed as LoggerInstalled};

use weasel_core::config::{ConfigSource, ServerConfig};
use weasel_core::config::paths::{default_log_dir, load_dotenv, resolve_config_dir};
use weasel_core::server::{ConnectionRegistry, start_server};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use log::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if LoggerInstalled() {
                error!("{e}");
            } else {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), WeaselError> {
    let env_result = load_dotenv();
    let config_dir = resolve_config_dir()?;
    let (config, config_source) = ServerConfig::load_with_source(&config_dir)?;

    let log_dir = config.logging.log_dir.clone().unwrap_or_else(default_log_dir);
    create_dir_all(&log_dir).map_err(|e| WeaselError::Config {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST; everything above ran before there was anywhere to log
    LoggerInitialize(&log_dir, config.logging.level_filter())?;

    info!("Weasel server starting");
    if let Some(path) = &env_result.path {
        info!("Loaded .env from {}", path.display());
    }
    if let Some((path, reason)) = &env_result.error {
        warn!("Failed to parse .env at {}: {reason}", path.display());
    }
    match &config_source {
        ConfigSource::File(path) => info!("Config loaded from {}", path.display()),
        ConfigSource::Defaults(path) => {
            info!("Config file not found at {}, using defaults", path.display())
        }
    }
    info!("Log directory: {}", log_dir.display());

    let handle = start_server(&config, ConnectionRegistry::new()).await?;

    tokio::select! {
        result = handle.wait() => {
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| WeaselError::Server {
                message: format!("Failed to listen for ctrl-c: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
            info!("Server stopped manually");
        }
    }

    Ok(())
}
