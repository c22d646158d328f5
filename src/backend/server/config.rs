/**
 * Server Configuration
 *
 * Reads `AppConfig` from the environment and selects the store.
 *
 * | Variable               | Default                   |
 * |------------------------|---------------------------|
 * | `PORT`                 | 3000                      |
 * | `DATABASE_URL`         | unset: in-memory store    |
 * | `JWT_SECRET`           | development secret, warns |
 * | `BROADCAST_CAPACITY`   | 1000                      |
 * | `CHANNEL_CLEANUP_SECS` | 300                       |
 * | `STATIC_DIR`           | `public`                  |
 *
 * A database that is configured but unreachable is logged and the server
 * falls back to the in-memory store rather than refusing to start.
 */
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::backend::store::{BoardStore, MemoryStore, PgStore};
use crate::shared::config::{AppConfig, ConfigError};

const DEV_JWT_SECRET: &str = "taskboard-development-secret";

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key,
                message: format!("cannot parse '{}'", raw),
            }),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = AppConfig::builder();

        if let Some(port) = env_parse::<u16>("PORT")? {
            builder = builder.server_port(port);
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                builder = builder.database_url(url);
            }
        }
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("[Config] JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        builder = builder.jwt_secret(secret);
        if let Some(capacity) = env_parse::<usize>("BROADCAST_CAPACITY")? {
            builder = builder.broadcast_capacity(capacity);
        }
        if let Some(secs) = env_parse::<u64>("CHANNEL_CLEANUP_SECS")? {
            builder = builder.channel_cleanup_interval(Duration::from_secs(secs));
        }
        if let Ok(dir) = std::env::var("STATIC_DIR") {
            builder = builder.static_dir(dir);
        }
        builder.build()
    }
}

/// Connect to PostgreSQL and run migrations
pub async fn load_database(database_url: &str) -> Option<PgPool> {
    tracing::info!("[Config] Connecting to database...");
    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Config] Failed to create database connection pool: {:?}", e);
            return None;
        }
    };

    tracing::info!("[Config] Running database migrations...");
    if let Err(e) = sqlx::migrate!().run(&pool).await {
        tracing::error!("[Config] Failed to run database migrations: {}", e);
        return None;
    }
    Some(pool)
}

/// PostgreSQL store if configured and reachable, in-memory store otherwise
pub async fn load_store(config: &AppConfig) -> Arc<dyn BoardStore> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("[Config] DATABASE_URL not set, boards are kept in memory only");
        return Arc::new(MemoryStore::new());
    };
    match load_database(url).await {
        Some(pool) => {
            tracing::info!("[Config] Using PostgreSQL store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("[Config] Database unavailable, falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}
