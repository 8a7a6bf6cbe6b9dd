//! Dispatch counters
//!
//! Lock-free counters shared between the dispatcher and whoever exports
//! them (the runtime mirrors them into Prometheus).
//!
//! ## Usage
//!
//! ```ignore
//! let stats = bridge.stats();
//! let snap = stats.snapshot();
//! println!("{} pending, {} stale", snap.pending(), snap.stale_events);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::domain::{FailureKind, TerminalOutcome};

/// Counters for the registry and dispatcher.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Handles allocated
    pub submitted: AtomicU64,
    /// Submissions refused before a handle was allocated
    pub rejected_submissions: AtomicU64,
    /// Success callbacks path
    pub succeeded: AtomicU64,
    /// Allocation failures
    pub failed_allocation: AtomicU64,
    /// Transport failures and refused starts
    pub failed_transport: AtomicU64,
    /// Non-success HTTP statuses
    pub failed_status: AtomicU64,
    /// Host aborts
    pub aborted: AtomicU64,
    /// Entries drained by shutdown
    pub rejected: AtomicU64,
    /// Progress events routed to a live entry
    pub progress_events: AtomicU64,
    /// Events for handles no longer registered
    pub stale_events: AtomicU64,
    /// Response bytes copied out
    pub response_bytes: AtomicU64,
    /// Cumulative submit-to-terminal time in microseconds
    pub lifetime_us: AtomicU64,
}

impl DispatchStats {
    /// New zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_submission(&self) {
        self.rejected_submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_progress(&self) {
        self.progress_events.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale(&self) {
        self.stale_events.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_response_bytes(&self, bytes: usize) {
        self.response_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record one terminal outcome and how long the request lived.
    pub(crate) fn record_outcome(&self, outcome: TerminalOutcome, lifetime: Duration) {
        let counter = match outcome {
            TerminalOutcome::Succeeded => &self.succeeded,
            TerminalOutcome::Failed(FailureKind::Allocation) => &self.failed_allocation,
            TerminalOutcome::Failed(FailureKind::Transport) => &self.failed_transport,
            TerminalOutcome::Failed(FailureKind::ProtocolStatus) => &self.failed_status,
            TerminalOutcome::Aborted => &self.aborted,
            TerminalOutcome::Rejected => &self.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.lifetime_us
            .fetch_add(lifetime.as_micros() as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected_submissions: self.rejected_submissions.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed_allocation: self.failed_allocation.load(Ordering::Relaxed),
            failed_transport: self.failed_transport.load(Ordering::Relaxed),
            failed_status: self.failed_status.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            progress_events: self.progress_events.load(Ordering::Relaxed),
            stale_events: self.stale_events.load(Ordering::Relaxed),
            response_bytes: self.response_bytes.load(Ordering::Relaxed),
            lifetime_us: self.lifetime_us.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of `DispatchStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSnapshot {
    /// Handles allocated
    pub submitted: u64,
    /// Submissions refused before a handle was allocated
    pub rejected_submissions: u64,
    /// Succeeded
    pub succeeded: u64,
    /// Allocation failures
    pub failed_allocation: u64,
    /// Transport failures
    pub failed_transport: u64,
    /// Non-success statuses
    pub failed_status: u64,
    /// Aborted
    pub aborted: u64,
    /// Drained by shutdown
    pub rejected: u64,
    /// Progress events routed
    pub progress_events: u64,
    /// Stale events ignored
    pub stale_events: u64,
    /// Response bytes copied out
    pub response_bytes: u64,
    /// Cumulative request lifetime in microseconds
    pub lifetime_us: u64,
}

impl DispatchSnapshot {
    /// All failure outcomes.
    pub fn failed(&self) -> u64 {
        self.failed_allocation + self.failed_transport + self.failed_status
    }

    /// Requests that reached a terminal state.
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed() + self.aborted + self.rejected
    }

    /// Handles allocated but not yet terminated.
    pub fn pending(&self) -> u64 {
        self.submitted.saturating_sub(self.completed())
    }

    /// Mean submit-to-terminal time.
    pub fn average_lifetime(&self) -> Duration {
        match self.completed() {
            0 => Duration::ZERO,
            n => Duration::from_micros(self.lifetime_us / n),
        }
    }
}
