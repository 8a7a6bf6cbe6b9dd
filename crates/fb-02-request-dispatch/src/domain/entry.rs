//! Submission input and the registry's per-request record.

use std::time::Instant;

use fb_01_buffer_relay::OwnedBuffer;
use shared_types::{Method, RequestHandle, UserArg};

use super::callbacks::Callbacks;
use super::policy::TargetKind;
use super::state::RequestState;

/// Everything a caller supplies for one request, except callbacks.
///
/// All byte and text fields are borrowed: the bridge copies what it needs
/// before `submit` returns, so the caller may reuse or free its buffers
/// immediately afterwards.
#[derive(Debug, Clone, Copy)]
pub struct SubmitRequest<'a> {
    /// Target URL or local resource path.
    pub url: &'a str,
    /// HTTP method name.
    pub method: &'a str,
    /// Request body. Only attached for methods that carry one.
    pub body: &'a [u8],
    /// Headers as JSON object text.
    pub headers: Option<&'a str>,
    /// Echoed back on every callback.
    pub user_arg: UserArg,
    /// Release the response buffer right after the success callback.
    pub free_response: bool,
}

impl<'a> SubmitRequest<'a> {
    /// GET with no body, no headers and free-response set.
    pub fn get(url: &'a str) -> Self {
        Self {
            url,
            method: "GET",
            body: &[],
            headers: None,
            user_arg: UserArg::default(),
            free_response: true,
        }
    }

    /// POST with the given body.
    pub fn post(url: &'a str, body: &'a [u8]) -> Self {
        Self {
            method: "POST",
            body,
            ..Self::get(url)
        }
    }

    /// Override the method.
    pub fn with_method(mut self, method: &'a str) -> Self {
        self.method = method;
        self
    }

    /// Attach the body.
    pub fn with_body(mut self, body: &'a [u8]) -> Self {
        self.body = body;
        self
    }

    /// Attach a JSON header payload.
    pub fn with_headers(mut self, headers: &'a str) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the user argument.
    pub fn with_user_arg(mut self, arg: impl Into<UserArg>) -> Self {
        self.user_arg = arg.into();
        self
    }

    /// Set the free-response flag.
    pub fn with_free_response(mut self, free: bool) -> Self {
        self.free_response = free;
        self
    }
}

/// Registry record for one live handle.
#[derive(Debug)]
pub struct PendingRequestEntry {
    /// Handle keying this entry.
    pub handle: RequestHandle,
    /// Target URL, kept for logging.
    pub url: String,
    /// Validated method.
    pub method: Method,
    /// Decides the success policy on `Loaded`.
    pub target: TargetKind,
    /// Copy of the request body, present only when the method carries one.
    pub submit_buffer: Option<OwnedBuffer>,
    /// Caller's callbacks.
    pub callbacks: Callbacks,
    /// Caller's opaque argument.
    pub user_arg: UserArg,
    /// Free-response flag.
    pub free_response: bool,
    /// Current lifecycle state. Never `Completed` while registered.
    pub state: RequestState,
    /// Submission time.
    pub created_at: Instant,
    /// Bytes loaded as of the last progress event.
    pub last_loaded: u64,
    /// Number of progress events seen.
    pub progress_events: u64,
}

impl PendingRequestEntry {
    /// Fresh `Submitted` entry.
    pub fn new(
        handle: RequestHandle,
        url: &str,
        method: Method,
        submit_buffer: Option<OwnedBuffer>,
        callbacks: Callbacks,
        user_arg: UserArg,
        free_response: bool,
    ) -> Self {
        Self {
            handle,
            url: url.to_string(),
            method,
            target: TargetKind::classify(url),
            submit_buffer,
            callbacks,
            user_arg,
            free_response,
            state: RequestState::Submitted,
            created_at: Instant::now(),
            last_loaded: 0,
            progress_events: 0,
        }
    }

    /// Record a progress event and move to `InProgress`.
    pub fn record_progress(&mut self, loaded: u64) {
        debug_assert!(self.state.can_transition_to(RequestState::InProgress));
        self.state = RequestState::InProgress;
        self.last_loaded = loaded;
        self.progress_events += 1;
    }

    /// Submit-side body bytes, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.submit_buffer.as_ref().map(OwnedBuffer::as_bytes)
    }
}
