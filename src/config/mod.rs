//! Configuration module for the school portal.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the portal API (required in production)
    pub api_psk: Option<String>,
    /// Path to the SQLite session store
    pub db_path: PathBuf,
    /// Base URL of the school management backend
    pub backend_url: String,
    /// Timeout applied to every backend request
    pub backend_timeout: Duration,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Raised when an environment variable holds an unusable value.
#[derive(Debug)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} value: {:?}", self.variable, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("PORTAL_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("PORTAL_DB_PATH")
            .unwrap_or_else(|_| "./data/portal.sqlite".to_string())
            .into();

        let backend_url = env::var("PORTAL_BACKEND_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_raw =
            env::var("PORTAL_BACKEND_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let backend_timeout = timeout_raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError {
                variable: "PORTAL_BACKEND_TIMEOUT_SECS",
                value: timeout_raw.clone(),
            })?;

        let bind_raw = env::var("PORTAL_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError {
            variable: "PORTAL_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let log_level = env::var("PORTAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_psk,
            db_path,
            backend_url,
            backend_timeout,
            bind_addr,
            log_level,
        })
    }
}
