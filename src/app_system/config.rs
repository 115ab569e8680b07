use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    /// Directory for JSON snapshots. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Bearer token for admin routes. `None` locks them entirely.
    pub admin_token: Option<String>,
    pub delivery_fee: Decimal,
    /// Mailbox capacity of every resource actor.
    pub actor_buffer: usize,
    pub request_timeout: Duration,
    /// Directory for daily rolling log files, in addition to stdout.
    pub log_dir: Option<PathBuf>,
    /// Fill an empty catalog with the default juice range on start.
    pub seed_catalog: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 5000,
            data_dir: None,
            admin_token: None,
            delivery_fee: Decimal::from(20),
            actor_buffer: 32,
            request_timeout: Duration::from_millis(30_000),
            log_dir: None,
            seed_catalog: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            http_host: text("HTTP_HOST").unwrap_or(defaults.http_host),
            http_port: parsed("HTTP_PORT")?.unwrap_or(defaults.http_port),
            data_dir: text("DATA_DIR").map(PathBuf::from),
            admin_token: text("ADMIN_TOKEN"),
            delivery_fee: parsed("DELIVERY_FEE")?.unwrap_or(defaults.delivery_fee),
            actor_buffer: parsed("ACTOR_BUFFER")?.filter(|n| *n > 0).unwrap_or(defaults.actor_buffer),
            request_timeout: parsed("REQUEST_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            log_dir: text("LOG_DIR").map(PathBuf::from),
            seed_catalog: parsed("SEED_CATALOG")?.unwrap_or(defaults.seed_catalog),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.http_host, self.http_port);
        raw.parse().map_err(|_| ConfigError::Invalid { name: "HTTP_HOST", value: raw })
    }
}

fn text(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match text(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
