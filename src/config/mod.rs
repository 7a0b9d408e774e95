//! Configuration management
//!
//! All settings come from environment variables (with a `.env` file
//! loaded when present) and fall back to lab-friendly defaults.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// JWT signing secret
    pub jwt_secret: String,

    /// Access token TTL in seconds (default: 900 = 15 minutes)
    pub access_token_ttl_seconds: i64,

    /// Refresh token TTL in days (default: 7)
    pub refresh_token_ttl_days: i64,

    /// Nonce TTL in seconds (default: 300 = 5 minutes)
    pub nonce_ttl_seconds: i64,

    /// Directory for the JSON store documents
    pub data_dir: PathBuf,

    /// Rate limit: requests per second per client
    pub rate_limit_rps: u32,

    /// CORS allowed origins (comma-separated)
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG fallback)
    pub log_level: String,

    /// Username of the provisioned lab account
    pub demo_username: String,

    /// Password of the provisioned lab account
    pub demo_password: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "4001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "development-secret-change-in-production".to_string());

        let access_token_ttl_seconds = env::var("ACCESS_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900);

        let refresh_token_ttl_days = env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7);

        let nonce_ttl_seconds = env::var("NONCE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let rate_limit_rps = env::var("RATE_LIMIT_RPS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let demo_username = env::var("DEMO_USERNAME").unwrap_or_else(|_| "user".to_string());
        let demo_password = env::var("DEMO_PASSWORD").unwrap_or_else(|_| "pass".to_string());

        Ok(Config {
            port,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
            nonce_ttl_seconds,
            data_dir,
            rate_limit_rps,
            cors_allowed_origins,
            log_level,
            demo_username,
            demo_password,
        })
    }
}
