//! Runtime configuration with validation.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file,
//! `FB_*` environment variables.
//!
//! ```toml
//! [dispatch]
//! max_pending = 64
//!
//! [dispatch.relay]
//! max_request_bytes = 1048576
//! max_response_bytes = 0
//!
//! [transport]
//! user_agent = "my-game/1.0"
//! connect_timeout_ms = 2000
//! request_timeout_ms = 15000
//! max_redirects = 0
//! local_root = "assets"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use fb_02_request_dispatch::DispatchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound accepted for `max_redirects`.
pub const MAX_REDIRECTS_LIMIT: usize = 20;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read {path}: {error}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error text
        error: String,
    },

    /// TOML did not parse or did not match the schema.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// An `FB_*` variable held an unparsable value.
    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// Timeouts out of range.
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Other out-of-range setting.
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Host transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// `User-Agent` sent on network requests
    pub user_agent: String,
    /// TCP connect timeout
    pub connect_timeout_ms: u64,
    /// Whole-request timeout
    pub request_timeout_ms: u64,
    /// Redirects to follow. `0` means redirects are returned as-is.
    pub max_redirects: usize,
    /// Directory that local (non-`http`) targets are resolved against
    pub local_root: PathBuf,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("fetch-bridge/{}", crate::VERSION),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            max_redirects: 0,
            local_root: PathBuf::from("."),
        }
    }
}

impl TransportConfig {
    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Everything the runtime needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Registry and relay settings
    pub dispatch: DispatchConfig,
    /// Transport settings
    pub transport: TransportConfig,
}

impl RuntimeConfig {
    /// Load and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without validating.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults or `path`, then environment overrides, then validation.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FB_*` overrides read through `lookup`.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `FB_MAX_PENDING` | `dispatch.max_pending` |
    /// | `FB_MAX_REQUEST_BYTES` | `dispatch.relay.max_request_bytes` |
    /// | `FB_MAX_RESPONSE_BYTES` | `dispatch.relay.max_response_bytes` |
    /// | `FB_USER_AGENT` | `transport.user_agent` |
    /// | `FB_CONNECT_TIMEOUT_MS` | `transport.connect_timeout_ms` |
    /// | `FB_REQUEST_TIMEOUT_MS` | `transport.request_timeout_ms` |
    /// | `FB_MAX_REDIRECTS` | `transport.max_redirects` |
    /// | `FB_LOCAL_ROOT` | `transport.local_root` |
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        override_parsed(&lookup, "FB_MAX_PENDING", &mut self.dispatch.max_pending)?;
        override_parsed(
            &lookup,
            "FB_MAX_REQUEST_BYTES",
            &mut self.dispatch.relay.max_request_bytes,
        )?;
        override_parsed(
            &lookup,
            "FB_MAX_RESPONSE_BYTES",
            &mut self.dispatch.relay.max_response_bytes,
        )?;
        override_parsed(
            &lookup,
            "FB_CONNECT_TIMEOUT_MS",
            &mut self.transport.connect_timeout_ms,
        )?;
        override_parsed(
            &lookup,
            "FB_REQUEST_TIMEOUT_MS",
            &mut self.transport.request_timeout_ms,
        )?;
        override_parsed(&lookup, "FB_MAX_REDIRECTS", &mut self.transport.max_redirects)?;
        if let Some(agent) = lookup("FB_USER_AGENT") {
            self.transport.user_agent = agent;
        }
        if let Some(root) = lookup("FB_LOCAL_ROOT") {
            self.transport.local_root = PathBuf::from(root);
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "connect_timeout_ms cannot be 0".into(),
            ));
        }
        if self.transport.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "request_timeout_ms cannot be 0".into(),
            ));
        }
        if self.transport.connect_timeout_ms > self.transport.request_timeout_ms {
            return Err(ConfigError::InvalidTimeout(
                "connect_timeout_ms exceeds request_timeout_ms".into(),
            ));
        }
        if self.transport.max_redirects > MAX_REDIRECTS_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_redirects cannot exceed {MAX_REDIRECTS_LIMIT}"
            )));
        }
        if self.transport.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user_agent cannot be empty".into()));
        }
        Ok(())
    }
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup(key) {
        *slot = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value,
        })?;
    }
    Ok(())
}
