//! Application configuration loaded from environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Recommended minimum length of `JWT_SECRET`, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: one year, in minutes.
pub const MAX_JWT_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// JSON file holding the user collection.
    pub users_file: PathBuf,
    /// JWT signing secret. Required.
    pub jwt_secret: String,
    /// Lifetime of issued tokens, in minutes.
    pub jwt_ttl_minutes: i64,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let users_file = lookup("USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./users.json"));

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigLoadError::MissingJwtSecret)?;

        let jwt_ttl_minutes = match lookup("JWT_TTL_MINUTES") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|m| (1..=MAX_JWT_TTL_MINUTES).contains(m))
                .ok_or(ConfigLoadError::InvalidTtl)?,
            None => 60 * 24,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            users_file,
            jwt_secret,
            jwt_ttl_minutes,
            log_level,
        })
    }

    pub fn has_weak_secret(&self) -> bool {
        self.jwt_secret.len() < MIN_JWT_SECRET_LEN
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,
    #[error("JWT_TTL_MINUTES must be between 1 and {}", MAX_JWT_TTL_MINUTES)]
    InvalidTtl,
}
