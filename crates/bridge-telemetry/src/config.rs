//! Telemetry configuration from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

/// Logging and metrics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to startup logs
    pub service_name: String,

    /// Fallback filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Whether to write logs to stderr at all
    pub console_output: bool,

    /// ANSI colours in human-readable output
    pub ansi: bool,

    /// Register Prometheus collectors on init
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "fetch-bridge".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            console_output: true,
            ansi: true,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FB_SERVICE_NAME`: Service name (default: fetch-bridge)
    /// - `FB_LOG_LEVEL`: Filter used when `RUST_LOG` is unset (default: info)
    /// - `FB_JSON_LOGS`: JSON output (default: false)
    /// - `FB_CONSOLE_OUTPUT`: Console output (default: true)
    /// - `FB_ANSI`: Coloured output (default: true)
    /// - `FB_METRICS`: Register Prometheus metrics (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("FB_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("FB_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: lookup("FB_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.json_logs),
            console_output: lookup("FB_CONSOLE_OUTPUT")
                .map(|v| !is_falsy(&v))
                .unwrap_or(defaults.console_output),
            ansi: lookup("FB_ANSI")
                .map(|v| !is_falsy(&v))
                .unwrap_or(defaults.ansi),
            metrics_enabled: lookup("FB_METRICS")
                .map(|v| !is_falsy(&v))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Quiet configuration for tests and embedding: warnings only, no colour.
    pub fn quiet() -> Self {
        Self {
            log_level: "warn".to_string(),
            ansi: false,
            ..Self::default()
        }
    }
}

fn is_truthy(v: &str) -> bool {
    v.eq_ignore_ascii_case("true") || v == "1"
}

fn is_falsy(v: &str) -> bool {
    v.eq_ignore_ascii_case("false") || v == "0"
}
