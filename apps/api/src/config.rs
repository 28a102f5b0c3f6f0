//! API server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file path
    pub database_path: String,

    /// Rate-limit sliding window length in seconds
    pub rate_limit_window_secs: u64,

    /// Per-IP request ceiling inside the window
    pub rate_limit_ceiling: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(ApiConfig {
            http_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./relist.db".to_string()),

            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RATE_LIMIT_WINDOW_SECS".to_string()))?,

            rate_limit_ceiling: env::var("RATE_LIMIT_CEILING")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RATE_LIMIT_CEILING".to_string()))?,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
