//! Server configuration from `RAIL_TIMELINE_*` environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATA_DIR: &str = "N05-24_GML/UTF-8";
pub const DEFAULT_STATIC_DIR: &str = "web/static";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must not be empty")]
    Empty { name: &'static str },
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory the `FsStore` reads dataset objects from.
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub fetch_timeout: Option<Duration>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            fetch_timeout: Some(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(bind) = lookup("RAIL_TIMELINE_BIND") {
            config.bind_addr = non_empty("RAIL_TIMELINE_BIND", bind)?;
        }
        if let Some(dir) = lookup("RAIL_TIMELINE_DATA_DIR") {
            config.data_dir = PathBuf::from(non_empty("RAIL_TIMELINE_DATA_DIR", dir)?);
        }
        if let Some(dir) = lookup("RAIL_TIMELINE_STATIC_DIR") {
            config.static_dir = PathBuf::from(non_empty("RAIL_TIMELINE_STATIC_DIR", dir)?);
        }
        if let Some(raw) = lookup("RAIL_TIMELINE_FETCH_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeconds {
                    name: "RAIL_TIMELINE_FETCH_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.fetch_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(level) = lookup("RAIL_TIMELINE_LOG") {
            if !level.trim().is_empty() {
                config.log_level = level.trim().to_string();
            }
        }

        Ok(config)
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { name });
    }
    Ok(trimmed.to_string())
}
