//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::config::RetentionConfig;
use std::net::SocketAddr;

/// Default port; one above the OTLP/HTTP port so both can run side by side.
pub const DEFAULT_PORT: u16 = 4319;

/// Log output format of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `OTEL_INSPECT_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `OTEL_INSPECT_PORT`: The port to listen on (default: 4319)
/// - `OTEL_INSPECT_LOG_FORMAT`: `json` for JSON log lines (default: pretty)
/// - `OTEL_INSPECT_MAX_DATA_POINTS`: points kept per metric series (default: 1000)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Log output format.
    pub log_format: LogFormat,
    /// Tunables of the ingestion core.
    pub retention: RetentionConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `OTEL_INSPECT_PORT` is set but cannot be parsed as a valid port number
    /// - `OTEL_INSPECT_MAX_DATA_POINTS` is set but invalid
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("OTEL_INSPECT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("OTEL_INSPECT_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("OTEL_INSPECT_PORT must be a port number")?
            .unwrap_or(DEFAULT_PORT);

        let retention = RetentionConfig::from_env()?;

        Ok(Self {
            host,
            port,
            log_format: log_format_from_env(),
            retention,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

/// Reads `OTEL_INSPECT_LOG_FORMAT`; anything but `json` is pretty.
#[must_use]
pub fn log_format_from_env() -> LogFormat {
    match std::env::var("OTEL_INSPECT_LOG_FORMAT") {
        Ok(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
            retention: RetentionConfig::default(),
        }
    }
}
