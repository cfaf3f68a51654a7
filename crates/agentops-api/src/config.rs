//! # Service Configuration
//!
//! Runtime settings read from environment variables, with defaults for
//! local development. An empty variable counts as unset.
//!
//! | Variable           | Default                              |
//! |--------------------|--------------------------------------|
//! | `PORT`             | `8080`                               |
//! | `APP_ENV`          | `dev`                                |
//! | `LOG_LEVEL`        | `info`                               |
//! | `SHUTDOWN_TIMEOUT` | `10s`                                |
//! | `SCHEMA_PATH`      | `schemas/agent-event-v0.schema.json` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use agentops_schema::DEFAULT_SCHEMA_PATH;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ENV: &str = "dev";
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// A configuration variable held a value that could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {name}: {value:?}")]
pub struct ConfigError {
    /// Environment variable name.
    pub name: &'static str,
    /// Raw value as found in the environment.
    pub value: String,
}

impl ConfigError {
    fn new(name: &'static str, value: &str) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

/// Minimum severity of emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" | "" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::new("LOG_LEVEL", raw)),
        }
    }
}

/// Runtime settings for the ingest service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    /// Deployment environment label, logged at startup.
    pub env: String,
    pub log_level: LogLevel,
    /// Upper bound on graceful shutdown after a stop signal.
    pub shutdown_timeout: Duration,
    pub schema_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            env: DEFAULT_ENV.to_string(),
            log_level: LogLevel::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first variable whose value is
    /// present but unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let mut cfg = Self::default();

        if let Some(raw) = get("PORT") {
            cfg.port = match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::new("PORT", &raw)),
            };
        }

        if let Some(raw) = get("APP_ENV") {
            cfg.env = raw;
        }

        if let Some(raw) = get("LOG_LEVEL") {
            cfg.log_level = raw.parse()?;
        }

        if let Some(raw) = get("SHUTDOWN_TIMEOUT") {
            cfg.shutdown_timeout = match parse_duration(&raw) {
                Some(timeout) if !timeout.is_zero() => timeout,
                _ => return Err(ConfigError::new("SHUTDOWN_TIMEOUT", &raw)),
            };
        }

        if let Some(raw) = get("SCHEMA_PATH") {
            cfg.schema_path = PathBuf::from(raw);
        }

        Ok(cfg)
    }
}

/// Parse a duration such as `10s`, `500ms`, `1m30s` or `1.5h`.
///
/// Accepted units: `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`. Every number
/// needs a unit, and negative values are rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let mut rest = raw.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let amount: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total += amount * nanos_per_unit;
    }

    if !total.is_finite() || total > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total.round() as u64))
}
