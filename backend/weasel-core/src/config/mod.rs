pub mod paths;

use crate::error::config::ConfigError;
use crate::{WEASEL_DEFAULT_HOST, WEASEL_DEFAULT_PORT};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "weasel.toml";
const CONFIG_VERSION: u32 = 1;

const DEFAULT_CERT_PATH: &str = "/var/lib/local_server/certs/localhost.crt";
const DEFAULT_KEY_PATH: &str = "/var/lib/local_server/private/localhost.key";
const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// `0` asks the OS for an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlsConfig {
    #[serde(default = "default_cert_path")]
    pub cert_path: PathBuf,
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: default_cert_path(),
            key_path: default_key_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, falling back to `Info` for anything `validate` would reject.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub listen: ListenConfig,

    #[serde(default)]
    pub tls: TlsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            listen: ListenConfig::default(),
            tls: TlsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where a loaded [`ServerConfig`] came from. Both variants carry the file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at this path.
    Defaults(PathBuf),
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    WEASEL_DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    WEASEL_DEFAULT_PORT
}
fn default_cert_path() -> PathBuf {
    PathBuf::from(DEFAULT_CERT_PATH)
}
fn default_key_path() -> PathBuf {
    PathBuf::from(DEFAULT_KEY_PATH)
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ServerConfig {
    /// Load config from `{config_dir}/weasel.toml`.
    ///
    /// A missing file is not an error: the defaults describe the stock
    /// deployment (`localhost:8765` with certificates under `/var/lib/local_server`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read, parsed, or validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_source(config_dir).map(|(config, _)| config)
    }

    /// [`load`](Self::load), also reporting whether the file or the defaults were used.
    pub fn load_with_source(config_dir: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults(config_path)));
        }

        let config = Self::load_from_path(&config_path)?;
        Ok((config, ConfigSource::File(config_path)))
    }

    /// Load and validate a specific file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ServerConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.listen.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "listen.host cannot be empty".to_string(),
            });
        }

        if self.tls.cert_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "tls.cert_path cannot be empty".to_string(),
            });
        }

        if self.tls.key_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "tls.key_path cannot be empty".to_string(),
            });
        }

        if self.logging.level.parse::<LevelFilter>().is_err() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid log level: {} (expected off, error, warn, info, debug or trace)",
                    self.logging.level
                ),
            });
        }

        Ok(())
    }

    /// `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen.host, self.listen.port)
    }
}
