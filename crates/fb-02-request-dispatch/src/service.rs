//! Fetch bridge service: the request registry and event dispatcher.
//!
//! Flow:
//! 1. Caller calls `submit()`; the body is copied in, a handle allocated and
//!    the entry registered
//! 2. The transport is started with a view of the registered entry
//! 3. The host delivers zero or more `Progress` events, then one terminal
//!    event, through `deliver()`
//! 4. The terminal event removes the entry, fires the matching callback and
//!    releases the submit-side copy

use std::collections::HashMap;
use std::sync::Arc;

use fb_01_buffer_relay::BufferRelay;
use shared_types::status::{reason_phrase, ALLOCATION_FAILED, BRIDGE_SHUTDOWN};
use shared_types::{HandleAllocator, HostEvent, Method, RequestHandle};
use tracing::{debug, info, warn};

use crate::domain::{
    is_success, Callbacks, DispatchConfig, DispatchError, FailureKind, HeaderSet,
    PendingRequestEntry, RequestState, ResponsePayload, SubmitRequest, TerminalOutcome,
};
use crate::metrics::DispatchStats;
use crate::ports::{Delivery, EventSink, FetchApi, Transport, TransportRequest};

/// Registry, relay and transport for one bridge instance.
///
/// Single-threaded by construction: every method takes `&mut self`, so
/// lookup, state transition and cleanup of one handle never interleave.
pub struct FetchBridge<T: Transport> {
    transport: T,
    relay: BufferRelay,
    pending: HashMap<RequestHandle, PendingRequestEntry>,
    handles: HandleAllocator,
    config: DispatchConfig,
    stats: Arc<DispatchStats>,
    accepting: bool,
}

impl<T: Transport> FetchBridge<T> {
    /// Create a bridge around `transport`.
    pub fn new(transport: T, config: DispatchConfig) -> Self {
        debug!(
            transport = transport.name(),
            max_pending = config.max_pending,
            "Fetch bridge created"
        );
        Self {
            transport,
            relay: BufferRelay::new(config.relay),
            pending: HashMap::new(),
            handles: HandleAllocator::new(),
            config,
            stats: Arc::new(DispatchStats::new()),
            accepting: true,
        }
    }

    /// Create a bridge with the default configuration.
    pub fn with_defaults(transport: T) -> Self {
        Self::new(transport, DispatchConfig::default())
    }

    /// Submit a request.
    ///
    /// Returns the handle once the entry is registered and the transport
    /// started. A copy-in failure or a refused start still returns the
    /// handle; the request has then already completed through its error
    /// callback.
    pub fn submit(
        &mut self,
        request: SubmitRequest<'_>,
        callbacks: Callbacks,
    ) -> Result<RequestHandle, DispatchError> {
        let method = match self.validate(&request) {
            Ok(method) => method,
            Err(err) => {
                self.stats.record_rejected_submission();
                debug!(url = request.url, error = %err, "Submission rejected");
                return Err(err);
            }
        };

        let headers = request
            .headers
            .map(HeaderSet::parse_lenient)
            .unwrap_or_default();
        let handle = self.handles.allocate();
        self.stats.record_submitted();

        let submit_buffer = if method.carries_body() {
            match self.relay.copy_in(request.body) {
                Ok(buf) => Some(buf),
                Err(err) => {
                    warn!(handle = %handle, url = request.url, error = %err, "Request body copy-in failed");
                    let entry = PendingRequestEntry::new(
                        handle,
                        request.url,
                        method,
                        None,
                        callbacks,
                        request.user_arg,
                        request.free_response,
                    );
                    self.fail(
                        entry,
                        ALLOCATION_FAILED,
                        &err.to_string(),
                        FailureKind::Allocation,
                    );
                    return Ok(handle);
                }
            }
        } else {
            None
        };

        let entry = PendingRequestEntry::new(
            handle,
            request.url,
            method,
            submit_buffer,
            callbacks,
            request.user_arg,
            request.free_response,
        );
        self.pending.insert(handle, entry);
        debug!(
            handle = %handle,
            url = request.url,
            method = request.method,
            headers = headers.len(),
            body_len = request.body.len(),
            "Registered pending request"
        );

        let started = match self.pending.get(&handle) {
            Some(entry) => self.transport.start(TransportRequest {
                handle,
                url: &entry.url,
                method: &entry.method,
                headers: &headers,
                body: entry.body(),
                target: entry.target,
            }),
            None => Ok(()),
        };

        if let Err(err) = started {
            warn!(
                handle = %handle,
                transport = self.transport.name(),
                status = err.status,
                error = %err.status_text,
                "Transport refused request"
            );
            if let Some(entry) = self.pending.remove(&handle) {
                self.fail(entry, err.status, &err.status_text, FailureKind::Transport);
            }
        }

        Ok(handle)
    }

    fn validate(&self, request: &SubmitRequest<'_>) -> Result<Method, DispatchError> {
        if !self.accepting {
            return Err(DispatchError::ShutDown);
        }
        if request.url.is_empty() {
            return Err(DispatchError::InvalidRequest("empty url".to_string()));
        }
        let method = Method::parse(request.method)?;
        if let Some(limit) = self.config.pending_limit() {
            if self.pending.len() >= limit {
                return Err(DispatchError::TooManyPending { limit });
            }
        }
        Ok(method)
    }

    /// Route one host event to its request.
    pub fn deliver(&mut self, event: HostEvent) -> Delivery {
        match event {
            HostEvent::Progress {
                handle,
                loaded,
                total,
            } => {
                let Some(entry) = self.pending.get_mut(&handle) else {
                    return self.stale(handle, "progress");
                };
                entry.record_progress(loaded);
                self.stats.record_progress();
                if let Some(on_progress) = entry.callbacks.on_progress.as_mut() {
                    on_progress(handle, entry.user_arg, loaded, total.unwrap_or(0));
                }
                Delivery::Progress
            }
            HostEvent::Loaded {
                handle,
                status,
                status_text,
                body,
            } => {
                let Some(entry) = self.pending.remove(&handle) else {
                    return self.stale(handle, "loaded");
                };
                Delivery::Terminal(self.complete_loaded(entry, status, &status_text, &body))
            }
            HostEvent::Failed { handle, error } => {
                let Some(entry) = self.pending.remove(&handle) else {
                    return self.stale(handle, "failed");
                };
                Delivery::Terminal(self.fail(
                    entry,
                    error.status,
                    &error.status_text,
                    FailureKind::Transport,
                ))
            }
            HostEvent::Aborted { handle } => {
                let Some(entry) = self.pending.remove(&handle) else {
                    return self.stale(handle, "aborted");
                };
                self.finish(entry, TerminalOutcome::Aborted);
                Delivery::Terminal(TerminalOutcome::Aborted)
            }
        }
    }

    fn stale(&self, handle: RequestHandle, kind: &'static str) -> Delivery {
        self.stats.record_stale();
        warn!(handle = %handle, kind, "Event for unknown or completed handle");
        Delivery::Stale
    }

    fn complete_loaded(
        &mut self,
        mut entry: PendingRequestEntry,
        status: i32,
        status_text: &str,
        body: &[u8],
    ) -> TerminalOutcome {
        if !is_success(entry.target, status) {
            let text = if status_text.is_empty() {
                reason_phrase(status)
            } else {
                status_text
            };
            return self.fail(entry, status, text, FailureKind::ProtocolStatus);
        }

        // Without a success callback there is nobody to receive a copy.
        let Some(on_success) = entry.callbacks.on_success.take() else {
            return self.finish(entry, TerminalOutcome::Succeeded);
        };

        let response = match self.relay.copy_out(body) {
            Ok(response) => response,
            Err(err) => {
                warn!(handle = %entry.handle, error = %err, "Response copy-out failed");
                return self.fail(
                    entry,
                    ALLOCATION_FAILED,
                    &err.to_string(),
                    FailureKind::Allocation,
                );
            }
        };
        self.stats.record_response_bytes(response.len());

        if entry.free_response {
            on_success(entry.handle, entry.user_arg, ResponsePayload::Lent(&response));
            self.relay.release(response);
        } else {
            let response = self.relay.hand_off(response);
            on_success(
                entry.handle,
                entry.user_arg,
                ResponsePayload::Transferred(response),
            );
        }
        self.finish(entry, TerminalOutcome::Succeeded)
    }

    fn fail(
        &mut self,
        mut entry: PendingRequestEntry,
        status: i32,
        status_text: &str,
        kind: FailureKind,
    ) -> TerminalOutcome {
        if let Some(on_error) = entry.callbacks.on_error.take() {
            on_error(entry.handle, entry.user_arg, status, status_text);
        }
        self.finish(entry, TerminalOutcome::Failed(kind))
    }

    /// Common tail of every terminal path. The entry is already out of the
    /// registry; its submit-side copy is released here and nowhere else.
    fn finish(&mut self, mut entry: PendingRequestEntry, outcome: TerminalOutcome) -> TerminalOutcome {
        debug_assert!(entry.state.can_transition_to(RequestState::Completed));
        entry.state = RequestState::Completed;
        if let Some(buf) = entry.submit_buffer.take() {
            self.relay.release(buf);
        }
        let lifetime = entry.created_at.elapsed();
        self.stats.record_outcome(outcome, lifetime);
        debug!(
            handle = %entry.handle,
            url = %entry.url,
            outcome = outcome.as_str(),
            progress_events = entry.progress_events,
            elapsed_ms = lifetime.as_millis(),
            "Request completed"
        );
        outcome
    }

    /// Stop accepting submissions and reject every pending request through
    /// its error callback with `BRIDGE_SHUTDOWN`.
    ///
    /// Returns the number of drained entries. Calling it again drains nothing.
    pub fn shutdown(&mut self) -> usize {
        let was_accepting = std::mem::replace(&mut self.accepting, false);
        let mut handles: Vec<RequestHandle> = self.pending.keys().copied().collect();
        handles.sort_unstable();

        for &handle in &handles {
            self.transport.abort(handle);
            if let Some(entry) = self.pending.remove(&handle) {
                self.fail_rejected(entry);
            }
        }

        if was_accepting {
            info!(
                drained = handles.len(),
                live_buffers = self.relay.live_count(),
                "Fetch bridge shut down"
            );
        }
        handles.len()
    }

    fn fail_rejected(&mut self, mut entry: PendingRequestEntry) {
        if let Some(on_error) = entry.callbacks.on_error.take() {
            on_error(
                entry.handle,
                entry.user_arg,
                BRIDGE_SHUTDOWN,
                "bridge shut down",
            );
        }
        self.finish(entry, TerminalOutcome::Rejected);
    }

    /// Whether new submissions are accepted.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Number of live entries.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `handle` is live.
    pub fn is_pending(&self, handle: RequestHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// State of a live handle.
    pub fn state(&self, handle: RequestHandle) -> Option<RequestState> {
        self.pending.get(&handle).map(|entry| entry.state)
    }

    /// Live handles in allocation order.
    pub fn pending_handles(&self) -> Vec<RequestHandle> {
        let mut handles: Vec<_> = self.pending.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Buffer relay ledger.
    pub fn relay(&self) -> &BufferRelay {
        &self.relay
    }

    /// Shared counters.
    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably (host-initiated aborts go through here).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> FetchApi for FetchBridge<T> {
    fn submit(
        &mut self,
        request: SubmitRequest<'_>,
        callbacks: Callbacks,
    ) -> Result<RequestHandle, DispatchError> {
        FetchBridge::submit(self, request, callbacks)
    }

    fn pending_count(&self) -> usize {
        FetchBridge::pending_count(self)
    }

    fn is_pending(&self, handle: RequestHandle) -> bool {
        FetchBridge::is_pending(self, handle)
    }

    fn state(&self, handle: RequestHandle) -> Option<RequestState> {
        FetchBridge::state(self, handle)
    }

    fn shutdown(&mut self) -> usize {
        FetchBridge::shutdown(self)
    }
}

impl<T: Transport> EventSink for FetchBridge<T> {
    fn deliver(&mut self, event: HostEvent) -> Delivery {
        FetchBridge::deliver(self, event)
    }
}
