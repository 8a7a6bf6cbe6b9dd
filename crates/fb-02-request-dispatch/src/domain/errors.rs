//! # Domain Errors
//!
//! Errors surfaced synchronously by `submit`. Everything that goes wrong
//! after a handle exists is reported through that request's error callback
//! instead.

use shared_types::MethodError;
use thiserror::Error;

/// Submission rejected before a handle was allocated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Request is structurally unusable (e.g. empty URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Method name failed validation.
    #[error("invalid method: {0}")]
    InvalidMethod(#[from] MethodError),

    /// Registry already holds the configured maximum of pending requests.
    #[error("too many pending requests (limit {limit})")]
    TooManyPending {
        /// Configured limit
        limit: usize,
    },

    /// Bridge has been shut down.
    #[error("bridge is shut down")]
    ShutDown,
}

/// Header payload could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Not valid JSON.
    #[error("header payload is not valid JSON: {0}")]
    Malformed(String),

    /// Valid JSON but not an object.
    #[error("header payload is not a JSON object")]
    NotAnObject,

    /// Header name outside the HTTP token alphabet.
    #[error("invalid header name {0:?}")]
    InvalidName(String),

    /// Header value contains a line break or control character.
    #[error("invalid value for header {0:?}")]
    InvalidValue(String),
}

/// Clipboard write failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// No clipboard mechanism available on this host.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The mechanism exists but the write failed.
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}
