//! Default paths for daylock components
//!
//! Paths are user-writable by default (no root required):
//! - Data: `$XDG_DATA_HOME/daylock` or `~/.local/share/daylock`
//! - Config: `$XDG_CONFIG_HOME/daylock/config.toml` or
//!   `~/.config/daylock/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const DAYLOCK_DATA_DIR_ENV: &str = "DAYLOCK_DATA_DIR";

/// Environment variable for overriding the config file path
pub const DAYLOCK_CONFIG_ENV: &str = "DAYLOCK_CONFIG";

/// Rule database filename within the data directory
pub const DB_FILENAME: &str = "daylock.db";

/// Application subdirectory name
const APP_DIR: &str = "daylock";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$DAYLOCK_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/daylock` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/daylock` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(DAYLOCK_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking DAYLOCK_DATA_DIR env var.
/// Used for default values in configs where the env var is checked
/// separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$DAYLOCK_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/daylock/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/daylock/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(DAYLOCK_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/tmp").join(APP_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_contains_daylock() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("daylock"));
    }

    #[test]
    fn config_path_is_toml() {
        let path = default_config_path();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }
}
