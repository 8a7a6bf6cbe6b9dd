//! Host event loop.
//!
//! Owns the bridge and the receiving end of the transport's event channel,
//! and delivers events one at a time on the calling task. That single
//! consumer is what guarantees the dispatcher never sees two events for the
//! same handle concurrently.

use std::collections::HashMap;

use bridge_telemetry::metrics::HistogramTimer;
use bridge_telemetry::{
    time_histogram, REQUESTS_COMPLETED, REQUESTS_PENDING, REQUESTS_SUBMITTED, REQUEST_DURATION,
    RESPONSE_BYTES, RESPONSE_SIZE, STALE_EVENTS,
};
use fb_02_request_dispatch::{
    Callbacks, DispatchError, DispatchSnapshot, FailureKind, FetchBridge, SubmitRequest,
    TerminalOutcome,
};
use fb_02_request_dispatch::Delivery;
use shared_types::{HostEvent, RequestHandle};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::adapters::HttpTransport;
use crate::config::RuntimeConfig;
use crate::error::RuntimeError;

/// Bridge plus its event pump.
pub struct HostLoop {
    bridge: FetchBridge<HttpTransport>,
    events: mpsc::UnboundedReceiver<HostEvent>,
    timers: HashMap<RequestHandle, HistogramTimer>,
    mirrored: DispatchSnapshot,
    delivered: u64,
}

impl HostLoop {
    /// Build the transport and bridge. Must be called inside a tokio runtime.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = HttpTransport::new(&config.transport, tx)?;
        let bridge = FetchBridge::new(transport, config.dispatch);

        info!(
            user_agent = %config.transport.user_agent,
            local_root = %config.transport.local_root.display(),
            max_pending = config.dispatch.max_pending,
            "Host loop ready"
        );

        Ok(Self {
            bridge,
            events: rx,
            timers: HashMap::new(),
            mirrored: DispatchSnapshot::default(),
            delivered: 0,
        })
    }

    /// Submit a request through the bridge.
    pub fn submit(
        &mut self,
        request: SubmitRequest<'_>,
        callbacks: Callbacks,
    ) -> Result<RequestHandle, DispatchError> {
        let timer = time_histogram!(REQUEST_DURATION);
        let result = self.bridge.submit(request, callbacks);
        if let Ok(handle) = result {
            if self.bridge.is_pending(handle) {
                self.timers.insert(handle, timer);
            }
        }
        self.mirror_metrics();
        result
    }

    /// Deliver one event to the bridge.
    pub fn deliver(&mut self, event: HostEvent) -> Delivery {
        let body_len = match &event {
            HostEvent::Loaded { body, .. } => Some(body.len()),
            _ => None,
        };
        let handle = event.handle();
        let delivery = self.bridge.deliver(event);
        if let Some(len) = succeeded_body_len(delivery, body_len) {
            RESPONSE_BYTES.inc_by(len as u64);
            RESPONSE_SIZE.observe(len as f64);
        }
        if let Delivery::Terminal(outcome) = delivery {
            self.timers.remove(&handle);
            debug!(handle = %handle, outcome = %outcome, "Delivered terminal event");
        }
        self.delivered += 1;
        self.mirror_metrics();
        delivery
    }

    /// Deliver events until no request is pending.
    ///
    /// Returns the number of events delivered.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut delivered = 0;
        while self.bridge.pending_count() > 0 {
            let Some(event) = self.events.recv().await else {
                break;
            };
            self.deliver(event);
            delivered += 1;
        }
        delivered
    }

    /// Deliver events until `shutdown` flips to `true` (or its sender is
    /// dropped), then shut the bridge down.
    ///
    /// Returns the number of events delivered.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut delivered = 0;
        if *shutdown.borrow() {
            self.shutdown();
            return delivered;
        }
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        self.deliver(event);
                        delivered += 1;
                    }
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        self.shutdown();
        delivered
    }

    /// Ask the transport to abort `handle`. The bridge completes it when the
    /// resulting `Aborted` event is delivered.
    ///
    /// Returns `false` if the handle is not pending.
    pub fn abort(&mut self, handle: RequestHandle) -> bool {
        if !self.bridge.is_pending(handle) {
            return false;
        }
        use fb_02_request_dispatch::Transport;
        self.bridge.transport_mut().abort(handle);
        true
    }

    /// Reject everything pending and stop accepting submissions.
    pub fn shutdown(&mut self) -> usize {
        let drained = self.bridge.shutdown();
        self.timers.clear();
        self.mirror_metrics();
        drained
    }

    /// The bridge.
    pub fn bridge(&self) -> &FetchBridge<HttpTransport> {
        &self.bridge
    }

    /// Number of pending requests.
    pub fn pending_count(&self) -> usize {
        self.bridge.pending_count()
    }

    /// Events delivered since creation.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    fn mirror_metrics(&mut self) {
        let now = self.bridge.stats().snapshot();
        let prev = std::mem::replace(&mut self.mirrored, now);

        REQUESTS_SUBMITTED.inc_by(now.submitted.saturating_sub(prev.submitted));
        STALE_EVENTS.inc_by(now.stale_events.saturating_sub(prev.stale_events));

        let completed = [
            (TerminalOutcome::Succeeded, now.succeeded, prev.succeeded),
            (
                TerminalOutcome::Failed(FailureKind::Allocation),
                now.failed_allocation,
                prev.failed_allocation,
            ),
            (
                TerminalOutcome::Failed(FailureKind::Transport),
                now.failed_transport,
                prev.failed_transport,
            ),
            (
                TerminalOutcome::Failed(FailureKind::ProtocolStatus),
                now.failed_status,
                prev.failed_status,
            ),
            (TerminalOutcome::Aborted, now.aborted, prev.aborted),
            (TerminalOutcome::Rejected, now.rejected, prev.rejected),
        ];
        for (outcome, current, previous) in completed {
            if current > previous {
                REQUESTS_COMPLETED
                    .with_label_values(&[outcome.as_str()])
                    .inc_by(current - previous);
            }
        }

        REQUESTS_PENDING.set(self.bridge.pending_count() as i64);
    }
}

/// Body length to record for a delivery. Only successful completions count.
fn succeeded_body_len(delivery: Delivery, body_len: Option<usize>) -> Option<usize> {
    match delivery {
        Delivery::Terminal(TerminalOutcome::Succeeded) => body_len,
        _ => None,
    }
}
