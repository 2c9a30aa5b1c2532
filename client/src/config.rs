//! Configuration management for the client.

use std::env;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".justdo";
const DEFAULT_LOG_FILTER: &str = "justdo=info,justdo_client=info";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the on-device key-value files
    pub data_dir: PathBuf,
    /// tracing env-filter directive
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = env::var("JUSTDO_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        if data_dir.trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        let log_filter = env::var("JUSTDO_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            log_filter,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JUSTDO_DATA_DIR must not be empty")]
    EmptyDataDir,
}
