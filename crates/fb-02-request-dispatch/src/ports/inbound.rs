//! # Inbound Ports
//!
//! | Port | Driven by |
//! |------|-----------|
//! | `FetchApi` | native caller (submission, introspection, teardown) |
//! | `EventSink` | host event loop (progress and terminal events) |

use shared_types::{HostEvent, RequestHandle};

use crate::domain::{Callbacks, DispatchError, RequestState, SubmitRequest, TerminalOutcome};

/// What `deliver` did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Progress recorded (and the progress callback, if any, invoked).
    Progress,
    /// The request completed with this outcome and left the registry.
    Terminal(TerminalOutcome),
    /// No live entry for the handle; the event was ignored.
    Stale,
}

impl Delivery {
    /// Terminal outcome, if the event ended a request.
    pub fn outcome(&self) -> Option<TerminalOutcome> {
        match self {
            Self::Terminal(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

/// Caller-facing API.
///
/// # Example
///
/// ```rust,ignore
/// let handle = bridge.submit(
///     SubmitRequest::get("http://example.com/data").with_user_arg(42usize),
///     Callbacks::new().on_success(|h, arg, resp| println!("{h} {arg:?} {}", resp.len())),
/// )?;
/// ```
pub trait FetchApi {
    /// Register a request and start it in the transport.
    ///
    /// # Errors
    /// - `InvalidRequest`: empty URL
    /// - `InvalidMethod`: method is not an HTTP token
    /// - `TooManyPending`: registry is full
    /// - `ShutDown`: bridge no longer accepts work
    ///
    /// Failures after the handle exists go to the error callback instead.
    fn submit(
        &mut self,
        request: SubmitRequest<'_>,
        callbacks: Callbacks,
    ) -> Result<RequestHandle, DispatchError>;

    /// Number of live entries.
    fn pending_count(&self) -> usize;

    /// Whether `handle` is still live.
    fn is_pending(&self, handle: RequestHandle) -> bool;

    /// State of a live handle, `None` once it has terminated.
    fn state(&self, handle: RequestHandle) -> Option<RequestState>;

    /// Reject every pending request and stop accepting new ones.
    fn shutdown(&mut self) -> usize;
}

/// Host-facing delivery entry point.
///
/// Events for one handle must be delivered in order and never concurrently.
pub trait EventSink {
    /// Route one event to its request.
    fn deliver(&mut self, event: HostEvent) -> Delivery;
}
