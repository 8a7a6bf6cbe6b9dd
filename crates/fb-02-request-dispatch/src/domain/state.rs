//! # Request State Machine
//!
//! A registered entry is always `Submitted` or `InProgress`. `Completed` is
//! reached in the same step the entry leaves the registry.

use std::fmt;

/// Lifecycle state of one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Registered, transport started, nothing received yet.
    #[default]
    Submitted,
    /// At least one progress event received.
    InProgress,
    /// Terminal event dispatched.
    Completed,
}

impl RequestState {
    /// Check if transition to next state is valid.
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        match (self, next) {
            (Self::Submitted, Self::InProgress) => true,
            (Self::Submitted, Self::Completed) => true,
            (Self::InProgress, Self::InProgress) => true,
            (Self::InProgress, Self::Completed) => true,
            _ => false,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => f.write_str("submitted"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Which failure path ended a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Copy-in or copy-out could not allocate.
    Allocation,
    /// Connection-level failure, or the transport refused to start.
    Transport,
    /// A response arrived but its status is not a success.
    ProtocolStatus,
}

/// How a request reached `Completed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminalOutcome {
    /// Success callback path.
    Succeeded,
    /// Error callback path.
    Failed(FailureKind),
    /// Aborted by the host, no callback.
    Aborted,
    /// Drained by bridge shutdown, error callback with the shutdown marker.
    Rejected,
}

impl TerminalOutcome {
    /// Stable label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed(FailureKind::Allocation) => "allocation_failed",
            Self::Failed(FailureKind::Transport) => "transport_failed",
            Self::Failed(FailureKind::ProtocolStatus) => "status_failed",
            Self::Aborted => "aborted",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the error callback was the one invoked.
    pub fn invokes_error_callback(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Rejected)
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
