//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, once, at startup.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Allowed CORS origin (the frontend dev server by default)
    pub cors_origin: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("SHOPFRONT_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHOPFRONT_PORT".to_string()))?,

            database_path: env::var("SHOPFRONT_DB")
                .unwrap_or_else(|_| "./shopfront.db".to_string()),

            // In production this MUST be set via environment variable.
            jwt_secret: env::var("SHOPFRONT_JWT_SECRET")
                .unwrap_or_else(|_| "shopfront-dev-secret-change-in-production".to_string()),

            jwt_lifetime_secs: env::var("SHOPFRONT_JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("SHOPFRONT_JWT_LIFETIME_SECS".to_string())
                })?,

            cors_origin: env::var("SHOPFRONT_CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        };

        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "SHOPFRONT_JWT_LIFETIME_SECS".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
