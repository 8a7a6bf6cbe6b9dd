//! # Outbound Ports
//!
//! Dependencies the dispatcher drives: the host transport and the clipboard.
//! Both traits are synchronous and must not block; a transport hands its
//! results back later as `HostEvent`s through the host's event loop.

use std::collections::VecDeque;
use std::fmt;

use shared_types::{HostEvent, Method, RequestHandle, TransportError};
use tracing::{debug, warn};

use crate::domain::{ClipboardError, HeaderSet, TargetKind};

/// Request as handed to the transport.
///
/// Borrows from the registry entry; a transport that needs the data past
/// `start` must copy it.
#[derive(Debug, Clone, Copy)]
pub struct TransportRequest<'a> {
    /// Handle every resulting event must carry.
    pub handle: RequestHandle,
    /// Target URL or local path.
    pub url: &'a str,
    /// Method.
    pub method: &'a Method,
    /// Parsed headers (empty when none or malformed).
    pub headers: &'a HeaderSet,
    /// Submit-side body copy, only for methods that carry one.
    pub body: Option<&'a [u8]>,
    /// Network or local.
    pub target: TargetKind,
}

/// Host transport performing the actual I/O.
pub trait Transport {
    /// Begin the request. Must return without waiting for I/O.
    ///
    /// An `Err` means the request never started; the dispatcher completes
    /// it through the error callback with the error's status and text.
    fn start(&mut self, request: TransportRequest<'_>) -> Result<(), TransportError>;

    /// Cancel an in-flight request. The transport later reports
    /// `HostEvent::Aborted` for it if it was still running.
    fn abort(&mut self, _handle: RequestHandle) {}

    /// Transport name for logs.
    fn name(&self) -> &'static str;
}

/// Clipboard collaborator.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Fire-and-forget clipboard write. Failure is logged, never returned.
pub fn copy_to_clipboard<C: Clipboard + ?Sized>(clipboard: &mut C, text: &str) {
    match clipboard.write_text(text) {
        Ok(()) => debug!(bytes = text.len(), "Copied text to clipboard"),
        Err(err) => warn!(error = %err, "Clipboard write failed"),
    }
}

/// One call to `RecordingTransport::start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedRequest {
    /// Handle.
    pub handle: RequestHandle,
    /// URL.
    pub url: String,
    /// Method.
    pub method: Method,
    /// Headers in order.
    pub headers: Vec<(String, String)>,
    /// Body bytes as the transport saw them.
    pub body: Option<Vec<u8>>,
    /// Target kind.
    pub target: TargetKind,
}

type ReplyScript = Box<dyn FnMut(&StartedRequest) -> Vec<HostEvent> + Send>;

/// In-memory transport for tests.
///
/// Records every start and abort. An optional reply script turns each
/// started request into events queued in an outbox that the test drains
/// and delivers, the way a host loop would.
#[derive(Default)]
pub struct RecordingTransport {
    /// Requests started, in order.
    pub started: Vec<StartedRequest>,
    /// Handles passed to `abort`, in order.
    pub aborted: Vec<RequestHandle>,
    /// If set, the next `start` fails with this error.
    pub fail_next_start: Option<TransportError>,
    reply: Option<ReplyScript>,
    outbox: VecDeque<HostEvent>,
}

impl RecordingTransport {
    /// Transport with no reply script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `script(request)` for every started request.
    pub fn with_reply<F>(mut self, script: F) -> Self
    where
        F: FnMut(&StartedRequest) -> Vec<HostEvent> + Send + 'static,
    {
        self.reply = Some(Box::new(script));
        self
    }

    /// Queue an event by hand.
    pub fn push_event(&mut self, event: HostEvent) {
        self.outbox.push_back(event);
    }

    /// Next queued event.
    pub fn next_event(&mut self) -> Option<HostEvent> {
        self.outbox.pop_front()
    }

    /// Number of queued events.
    pub fn queued(&self) -> usize {
        self.outbox.len()
    }

    /// Last started request.
    pub fn last_started(&self) -> Option<&StartedRequest> {
        self.started.last()
    }
}

impl Transport for RecordingTransport {
    fn start(&mut self, request: TransportRequest<'_>) -> Result<(), TransportError> {
        if let Some(err) = self.fail_next_start.take() {
            return Err(err);
        }
        let started = StartedRequest {
            handle: request.handle,
            url: request.url.to_string(),
            method: request.method.clone(),
            headers: request
                .headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            body: request.body.map(<[u8]>::to_vec),
            target: request.target,
        };
        if let Some(script) = self.reply.as_mut() {
            self.outbox.extend(script(&started));
        }
        self.started.push(started);
        Ok(())
    }

    fn abort(&mut self, handle: RequestHandle) {
        self.aborted.push(handle);
        if self.started.iter().any(|s| s.handle == handle) {
            self.outbox.push_back(HostEvent::Aborted { handle });
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

impl fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingTransport")
            .field("started", &self.started.len())
            .field("aborted", &self.aborted)
            .field("queued", &self.outbox.len())
            .finish()
    }
}

/// In-memory clipboard for tests.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    /// Successful writes, in order.
    pub writes: Vec<String>,
    /// If set, every write fails with this error.
    pub fail_with: Option<ClipboardError>,
}

impl RecordingClipboard {
    /// Empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents.
    pub fn contents(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.writes.push(text.to_string());
        Ok(())
    }
}
