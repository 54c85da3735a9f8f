//! Logging setup
//!
//! TigerStyle: Explicit telemetry configuration, installed once per process.

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Log level filter, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Whether to emit ANSI colors
    pub ansi_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "berth".to_string(),
            log_level: "warn".to_string(),
            ansi_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create a new configuration with the given service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the log level filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Disable ANSI colors (e.g. when stderr is not a terminal)
    pub fn without_ansi(mut self) -> Self {
        self.ansi_enabled = false;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - `BERTH_SERVICE_NAME`: Service name (default: "berth")
    /// - `RUST_LOG`: Log level filter (default: "warn")
    /// - `NO_COLOR`: Disables ANSI colors when set
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("BERTH_SERVICE_NAME").unwrap_or_else(|_| "berth".to_string());
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
        let ansi_enabled = std::env::var_os("NO_COLOR").is_none();

        Self {
            service_name,
            log_level,
            ansi_enabled,
        }
    }
}

/// Install the global tracing subscriber
///
/// Logs go to stderr so interactive output on stdout stays clean.
/// `RUST_LOG` takes precedence over `config.log_level`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi_enabled)
        .try_init()
        .map_err(|e| {
            Error::internal(format!("failed to initialize tracing subscriber: {}", e))
        })?;

    tracing::debug!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}
