//! Runtime configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Both halves of the crate read plain env vars with typed defaults. Parsing
//! goes through a lookup closure so tests can feed a map instead of mutating
//! the process environment.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

// =============================================================================
// SERVER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Postgres URL. `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Secret mixed into anti-forgery tokens. `None` means generate one per process.
    pub csrf_secret: Option<String>,
}

impl ServerConfig {
    /// Read server settings from the process environment.
    ///
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: optional
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `CSRF_SECRET`: optional
    ///
    /// # Errors
    ///
    /// Returns an error if a present value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_or("PORT", &lookup, DEFAULT_PORT)?,
            database_url: non_empty(lookup("DATABASE_URL")),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", &lookup, DEFAULT_DB_MAX_CONNECTIONS)?,
            csrf_secret: non_empty(lookup("CSRF_SECRET")),
        })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin of the help desk, e.g. `https://desk.example.com`.
    pub base_url: String,
    /// Upper bound on a single request. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub stats_interval: Duration,
    pub search_debounce: Duration,
}

impl ClientConfig {
    /// Client settings with defaults for everything except the origin.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            request_timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            stats_interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }

    /// Read client settings from the process environment.
    ///
    /// Required:
    /// - `QUICKDESK_BASE_URL`
    ///
    /// Optional:
    /// - `QUICKDESK_REQUEST_TIMEOUT_SECS`: unset means no timeout
    /// - `QUICKDESK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `QUICKDESK_STATS_INTERVAL_SECS`: default 300
    /// - `QUICKDESK_SEARCH_DEBOUNCE_MS`: default 500
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing, a value does not parse,
    /// or a timeout or the stats interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = non_empty(lookup("QUICKDESK_BASE_URL")).ok_or(ConfigError::Missing("QUICKDESK_BASE_URL"))?;
        let mut config = Self::new(base_url);

        config.request_timeout = match non_empty(lookup("QUICKDESK_REQUEST_TIMEOUT_SECS")) {
            Some(raw) => Some(Duration::from_secs(non_zero(
                "QUICKDESK_REQUEST_TIMEOUT_SECS",
                parse_value("QUICKDESK_REQUEST_TIMEOUT_SECS", &raw)?,
            )?)),
            None => None,
        };
        config.connect_timeout = Duration::from_secs(non_zero(
            "QUICKDESK_CONNECT_TIMEOUT_SECS",
            parse_or("QUICKDESK_CONNECT_TIMEOUT_SECS", &lookup, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        )?);
        config.stats_interval = Duration::from_secs(non_zero(
            "QUICKDESK_STATS_INTERVAL_SECS",
            parse_or("QUICKDESK_STATS_INTERVAL_SECS", &lookup, DEFAULT_STATS_INTERVAL_SECS)?,
        )?);
        config.search_debounce =
            Duration::from_millis(parse_or("QUICKDESK_SEARCH_DEBOUNCE_MS", &lookup, DEFAULT_SEARCH_DEBOUNCE_MS)?);

        Ok(config)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { key, value: raw.to_owned() })
}

/// Timeouts and the poll interval must be positive.
fn non_zero(key: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid { key, value: value.to_string() });
    }
    Ok(value)
}

fn parse_or<T>(key: &'static str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match non_empty(lookup(key)) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
