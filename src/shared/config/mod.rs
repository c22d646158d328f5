//! Application configuration module
//!
//! Provides configuration types for the board server. Values are normally
//! read from the environment by the backend (`AppConfig::from_env`), but the
//! builder is usable anywhere, which is how tests construct configs.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BROADCAST_CAPACITY: usize = 1000;
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds on all interfaces
    pub server_port: u16,
    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HMAC secret used to verify bearer tokens
    pub jwt_secret: String,
    /// Capacity of each per-board broadcast channel
    pub broadcast_capacity: usize,
    /// How often idle board channels are pruned
    pub channel_cleanup_interval: Duration,
    /// Directory holding the pre-built client
    pub static_dir: String,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SERVER_PORT",
                message: "port must be non-zero".to_string(),
            });
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "BROADCAST_CAPACITY",
                message: "capacity must be at least 1".to_string(),
            });
        }
        if self.channel_cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "CHANNEL_CLEANUP_SECS",
                message: "interval must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    broadcast_capacity: Option<usize>,
    channel_cleanup_interval: Option<Duration>,
    static_dir: Option<String>,
}

impl AppConfigBuilder {
    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = Some(capacity);
        self
    }

    pub fn channel_cleanup_interval(mut self, interval: Duration) -> Self {
        self.channel_cleanup_interval = Some(interval);
        self
    }

    pub fn static_dir(mut self, dir: impl Into<String>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            server_port: self.server_port.unwrap_or(DEFAULT_PORT),
            database_url: self.database_url,
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("JWT_SECRET"))?,
            broadcast_capacity: self.broadcast_capacity.unwrap_or(DEFAULT_BROADCAST_CAPACITY),
            channel_cleanup_interval: self
                .channel_cleanup_interval
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL),
            static_dir: self
                .static_dir
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
