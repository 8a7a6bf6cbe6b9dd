//! Prometheus metrics for the fetch bridge.
//!
//! All metrics follow the naming convention: `fb_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: submissions, completions by outcome, stale events, bytes
//! - **Gauge**: requests currently pending
//! - **Histogram**: submit-to-terminal duration

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Bridge metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Handles allocated
    pub static ref REQUESTS_SUBMITTED: IntCounter = IntCounter::new(
        "fb_requests_submitted_total",
        "Total number of requests accepted by the bridge"
    ).expect("metric creation failed");

    /// Terminal outcomes
    pub static ref REQUESTS_COMPLETED: IntCounterVec = IntCounterVec::new(
        Opts::new("fb_requests_completed_total", "Requests that reached a terminal state"),
        &["outcome"]  // succeeded/allocation_failed/transport_failed/status_failed/aborted/rejected
    ).expect("metric creation failed");

    /// Events for unknown or completed handles
    pub static ref STALE_EVENTS: IntCounter = IntCounter::new(
        "fb_stale_events_total",
        "Host events delivered for handles no longer registered"
    ).expect("metric creation failed");

    /// Live registry entries
    pub static ref REQUESTS_PENDING: IntGauge = IntGauge::new(
        "fb_requests_pending",
        "Requests currently registered"
    ).expect("metric creation failed");

    /// Response bytes received by the host loop
    pub static ref RESPONSE_BYTES: IntCounter = IntCounter::new(
        "fb_response_bytes_total",
        "Total response body bytes delivered to the dispatcher"
    ).expect("metric creation failed");

    /// Submit-to-terminal duration
    pub static ref REQUEST_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fb_request_duration_seconds",
            "Time from submission to terminal event"
        ).buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0])
    ).expect("metric creation failed");

    /// Size of response bodies
    pub static ref RESPONSE_SIZE: Histogram = Histogram::with_opts(
        HistogramOpts::new("fb_response_size_bytes", "Response body size")
            .buckets(exponential_buckets(64.0, 4.0, 10).unwrap_or_default())
    ).expect("metric creation failed");
}

/// Handle returned by `register_metrics`.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// Registry the metrics live in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render in the Prometheus text format.
    pub fn gather_text(&self) -> Result<String, TelemetryError> {
        gather_text()
    }
}

/// Register all bridge metrics with `REGISTRY`.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(REQUESTS_SUBMITTED.clone()),
        Box::new(REQUESTS_COMPLETED.clone()),
        Box::new(STALE_EVENTS.clone()),
        Box::new(REQUESTS_PENDING.clone()),
        Box::new(RESPONSE_BYTES.clone()),
        Box::new(REQUEST_DURATION.clone()),
        Box::new(RESPONSE_SIZE.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
