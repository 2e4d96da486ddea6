//! Daemon configuration
//!
//! daylockd reads an optional TOML file for service tunables. Rules
//! themselves live in the database, not here; an absent config file just
//! means defaults.

use daylock_util::data_dir_without_env;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_poll_interval_secs")]
    poll_interval_secs: u64,

    #[serde(default = "default_terminate_timeout_secs")]
    terminate_timeout_secs: u64,

    data_dir: Option<PathBuf>,
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_terminate_timeout_secs() -> u64 {
    5
}

/// Resolved daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub poll_interval: Duration,
    pub terminate_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(default_poll_interval_secs()),
            terminate_timeout: Duration::from_secs(default_terminate_timeout_secs()),
            data_dir: data_dir_without_env(),
        }
    }
}

/// Load configuration from a TOML file. A missing file yields defaults.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<DaemonConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(DaemonConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<DaemonConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.poll_interval_secs == 0 {
        return Err(ConfigError::Invalid("poll_interval_secs must be nonzero".into()));
    }
    if raw.terminate_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "terminate_timeout_secs must be nonzero".into(),
        ));
    }

    Ok(DaemonConfig {
        poll_interval: Duration::from_secs(raw.poll_interval_secs),
        terminate_timeout: Duration::from_secs(raw.terminate_timeout_secs),
        data_dir: raw.data_dir.unwrap_or_else(data_dir_without_env),
    })
}
