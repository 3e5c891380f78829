use std::time::Duration;
use thiserror::Error;

/// Runtime configuration, read from the environment (and `.env` if present)
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum pooled connections
    pub pool_max_size: u32,

    /// How long a request waits for a free pooled connection
    pub connection_timeout: Duration,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,

    /// Address the HTTP server binds to
    pub server_addr: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            pool_max_size: parse_or(&lookup, "DB_POOL_MAX_SIZE", 10)?,
            connection_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECTION_TIMEOUT_SECS",
                5,
            )?),
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
