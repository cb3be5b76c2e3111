use std::env;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Output shape for the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnknownLogFormat {
                value: other.to_string(),
            }),
        }
    }
}

/// Top-level configuration for the supplier registry service, assembled from
/// `REGISTRY_*` environment variables (a `.env` file is honored if present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub metrics: MetricsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::from_str(&var_or("REGISTRY_ENV", "development")),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig::from_env()?,
            metrics: MetricsConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = var_or("REGISTRY_HOST", "127.0.0.1");
        let raw_port = var_or("REGISTRY_PORT", "8000");
        let port = raw_port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort { value: raw_port })?;
        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls: default filter directive plus output shape.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl TelemetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            log_level: var_or("REGISTRY_LOG_LEVEL", "info"),
            log_format: LogFormat::from_str(&var_or("REGISTRY_LOG_FORMAT", "compact"))?,
        })
    }
}

/// Whether the prometheus layer and `/metrics` endpoint are mounted.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl MetricsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = var_or("REGISTRY_METRICS_ENABLED", "true");
        let enabled = parse_toggle(&raw).ok_or(ConfigError::InvalidToggle { value: raw })?;
        Ok(Self { enabled })
    }
}

fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("REGISTRY_PORT must be a valid u16, got '{value}'")]
    InvalidPort { value: String },
    #[error("REGISTRY_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("REGISTRY_LOG_FORMAT must be 'compact' or 'json', got '{value}'")]
    UnknownLogFormat { value: String },
    #[error("REGISTRY_METRICS_ENABLED must be a boolean toggle, got '{value}'")]
    InvalidToggle { value: String },
}
