//! Service configuration parsed from environment variables.
//!
//! `.env` files are loaded by `main` through `dotenvy` before this runs, so
//! everything here reads plain process environment.

use crate::services::funnel::OutcomeRecording;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_STORE_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STORE_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(String),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Connection settings for a PostgREST-compatible participation store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeouts: StoreTimeouts,
}

/// Where campaigns and participations live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String, max_connections: u32 },
    Rest(RestConfig),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub outcome_recording: OutcomeRecording,
    pub sessions: SessionLimits,
}

/// Idle funnel sessions are dropped after `ttl_secs` without a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub ttl_secs: u64,
    /// How often the background sweep runs.
    pub sweep_secs: u64,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_SESSION_TTL_SECS, sweep_secs: DEFAULT_SESSION_SWEEP_SECS }
    }
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// - `PORT`: listen port (default 3000)
    /// - `STORE_BACKEND`: `postgres` (default), `rest`, or `memory`
    /// - `DATABASE_URL`: required for `postgres`
    /// - `DB_MAX_CONNECTIONS`: pool size (default 5)
    /// - `STORE_REST_URL`: required for `rest`
    /// - `STORE_REST_KEY_ENV`: names the env var holding the REST API key
    /// - `STORE_REQUEST_TIMEOUT_SECS` / `STORE_CONNECT_TIMEOUT_SECS`: REST client timeouts
    /// - `OUTCOME_RECORDING`: `linked` (default) or `separate`
    /// - `SESSION_TTL_SECS`: idle funnel session lifetime (default 1800)
    /// - `SESSION_SWEEP_SECS`: expiry sweep period (default 60)
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse_strict("PORT", DEFAULT_PORT)?;
        let store = parse_backend(std::env::var("STORE_BACKEND").ok().as_deref())?;
        let outcome_recording = match std::env::var("OUTCOME_RECORDING").ok().as_deref() {
            None => OutcomeRecording::default(),
            Some(raw) => OutcomeRecording::parse(raw).ok_or_else(|| ConfigError::Invalid {
                var: "OUTCOME_RECORDING".into(),
                value: raw.into(),
            })?,
        };
        let sessions = SessionLimits {
            ttl_secs: env_parse_strict("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            sweep_secs: env_parse("SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS).max(1),
        };
        Ok(Self { port, store, outcome_recording, sessions })
    }
}

fn parse_backend(raw: Option<&str>) -> Result<StoreBackend, ConfigError> {
    match raw.unwrap_or("postgres") {
        "postgres" => Ok(StoreBackend::Postgres {
            database_url: required("DATABASE_URL")?,
            max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
        }),
        "rest" => {
            let base_url = required("STORE_REST_URL")?.trim_end_matches('/').to_string();
            let key_var = required("STORE_REST_KEY_ENV")?;
            let api_key = required(&key_var)?;
            let timeouts = StoreTimeouts {
                request_secs: env_parse("STORE_REQUEST_TIMEOUT_SECS", DEFAULT_STORE_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("STORE_CONNECT_TIMEOUT_SECS", DEFAULT_STORE_CONNECT_TIMEOUT_SECS),
            };
            Ok(StoreBackend::Rest(RestConfig { base_url, api_key, timeouts }))
        }
        "memory" => Ok(StoreBackend::Memory),
        other => Err(ConfigError::Invalid { var: "STORE_BACKEND".into(), value: other.into() }),
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

/// Parse an optional env var, falling back to `default` when absent or malformed.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Like [`env_parse`], but a present-and-malformed value is an error.
fn env_parse_strict<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var: key.to_string(), value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
