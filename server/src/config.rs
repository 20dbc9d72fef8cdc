//! Server configuration parsed from environment variables.
//!
//! `.env` is loaded by `main` before this runs, so values may come from
//! either the process environment or the file.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PDF_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_PDF_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub pdf_fetch_timeout: Duration,
    pub pdf_connect_timeout: Duration,
}

impl ServerConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `BIND_ADDR`: default `0.0.0.0:3000`
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `PDF_FETCH_TIMEOUT_SECS`: default 20
    /// - `PDF_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = lookup("BIND_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections: env_parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            pdf_fetch_timeout: Duration::from_secs(env_parse(
                &lookup,
                "PDF_FETCH_TIMEOUT_SECS",
                DEFAULT_PDF_FETCH_TIMEOUT_SECS,
            )),
            pdf_connect_timeout: Duration::from_secs(env_parse(
                &lookup,
                "PDF_CONNECT_TIMEOUT_SECS",
                DEFAULT_PDF_CONNECT_TIMEOUT_SECS,
            )),
        })
    }
}

/// Parse `key` or fall back to `default`, logging values that do not parse.
fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!(key, value = %raw, %default, "unparsable config value; using default");
            default
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
