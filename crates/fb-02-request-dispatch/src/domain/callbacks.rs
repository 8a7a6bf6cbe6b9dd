//! # Callback Set
//!
//! Each callback is optional; an absent callback means "do not invoke".
//! The set is fixed at submission and owned by the pending entry.

use std::fmt;

use fb_01_buffer_relay::OwnedBuffer;
use shared_types::{RequestHandle, UserArg};

/// Success: `(handle, user_arg, response)`.
pub type SuccessCallback = Box<dyn FnOnce(RequestHandle, UserArg, ResponsePayload<'_>) + Send>;

/// Error: `(handle, user_arg, status, status_text)`.
pub type ErrorCallback = Box<dyn FnOnce(RequestHandle, UserArg, i32, &str) + Send>;

/// Progress: `(handle, user_arg, loaded, total_or_zero)`.
pub type ProgressCallback = Box<dyn FnMut(RequestHandle, UserArg, u64, u64) + Send>;

/// Response handed to the success callback.
pub enum ResponsePayload<'a> {
    /// Free-response flag set: the relay keeps ownership and releases the
    /// buffer as soon as the callback returns.
    Lent(&'a OwnedBuffer),
    /// Free-response flag unset: ownership passes to the callback, which
    /// releases the buffer by dropping it.
    Transferred(OwnedBuffer),
}

impl ResponsePayload<'_> {
    /// Response bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Lent(buf) => buf.as_bytes(),
            Self::Transferred(buf) => buf.as_bytes(),
        }
    }

    /// Response length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the response is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Whether ownership was transferred to the callback.
    pub fn is_transferred(&self) -> bool {
        matches!(self, Self::Transferred(_))
    }

    /// Take ownership of a transferred buffer. `None` for a lent one.
    pub fn into_owned(self) -> Option<OwnedBuffer> {
        match self {
            Self::Lent(_) => None,
            Self::Transferred(buf) => Some(buf),
        }
    }
}

impl fmt::Debug for ResponsePayload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_transferred() { "Transferred" } else { "Lent" };
        f.debug_struct("ResponsePayload")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Callbacks registered for one request.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) on_progress: Option<ProgressCallback>,
}

impl Callbacks {
    /// No callbacks at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success callback.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RequestHandle, UserArg, ResponsePayload<'_>) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Set the error callback.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RequestHandle, UserArg, i32, &str) + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Set the progress callback.
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(RequestHandle, UserArg, u64, u64) + Send + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Whether a success callback is registered.
    pub fn has_success(&self) -> bool {
        self.on_success.is_some()
    }

    /// Whether an error callback is registered.
    pub fn has_error(&self) -> bool {
        self.on_error.is_some()
    }

    /// Whether a progress callback is registered.
    pub fn has_progress(&self) -> bool {
        self.on_progress.is_some()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.has_success())
            .field("on_error", &self.has_error())
            .field("on_progress", &self.has_progress())
            .finish()
    }
}
