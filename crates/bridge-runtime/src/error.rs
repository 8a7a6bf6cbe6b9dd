//! Runtime errors.

use bridge_telemetry::TelemetryError;
use fb_02_request_dispatch::DispatchError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while building or driving the host runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Submission refused by the dispatcher.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Telemetry could not be initialised.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),

    /// Not called from within a tokio runtime.
    #[error("no tokio runtime: {0}")]
    NoRuntime(String),
}
