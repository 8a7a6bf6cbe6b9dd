//! # Host Events
//!
//! Events a transport delivers back to the dispatcher. For a given handle the
//! host delivers zero or more `Progress` events, then exactly one terminal
//! event. Events for different handles may interleave freely.

use serde::{Deserialize, Serialize};

use crate::entities::RequestHandle;
use crate::errors::TransportError;

/// One notification from the host transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    /// Bytes have been transferred.
    Progress {
        /// Target request.
        handle: RequestHandle,
        /// Bytes transferred so far.
        loaded: u64,
        /// Total bytes, when the transport knows it.
        total: Option<u64>,
    },

    /// A response was received (any status).
    Loaded {
        /// Target request.
        handle: RequestHandle,
        /// Response status.
        status: i32,
        /// Response status text.
        status_text: String,
        /// Response body, owned by the event until the relay copies it out.
        body: Vec<u8>,
    },

    /// Connection-level failure, no response was received.
    Failed {
        /// Target request.
        handle: RequestHandle,
        /// Status/text reported by the transport.
        error: TransportError,
    },

    /// The request was aborted by the host.
    Aborted {
        /// Target request.
        handle: RequestHandle,
    },
}

impl HostEvent {
    /// Handle the event is addressed to.
    pub fn handle(&self) -> RequestHandle {
        match self {
            Self::Progress { handle, .. }
            | Self::Loaded { handle, .. }
            | Self::Failed { handle, .. }
            | Self::Aborted { handle } => *handle,
        }
    }

    /// Whether the event ends the request's lifecycle.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    /// Short event name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Loaded { .. } => "loaded",
            Self::Failed { .. } => "failed",
            Self::Aborted { .. } => "aborted",
        }
    }
}
