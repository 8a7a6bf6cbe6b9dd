//! # Error Types
//!
//! Errors shared between the dispatcher and the transports that feed it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Method name failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MethodError {
    /// Empty method name.
    #[error("method is empty")]
    Empty,

    /// Character outside the HTTP token alphabet.
    #[error("method contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Connection-level failure reported by a transport.
///
/// Carries the status/text pair that is forwarded verbatim to the error
/// callback. Transports without an HTTP status report `0`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("transport error [{status}]: {status_text}")]
pub struct TransportError {
    /// Status code handed to the error callback.
    pub status: i32,
    /// Status text handed to the error callback.
    pub status_text: String,
}

impl TransportError {
    /// Create a transport error.
    pub fn new(status: i32, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
        }
    }

    /// Failure with no HTTP status (DNS, refused connection, timeout).
    pub fn network(status_text: impl Into<String>) -> Self {
        Self::new(0, status_text)
    }
}
