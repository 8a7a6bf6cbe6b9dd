//! # FB-02 Request Dispatch
//!
//! Request Registry & Dispatcher: the state machine that governs one request
//! from submission to terminal cleanup, and the single authority on whether a
//! handle has already terminated.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Lifecycle
//!
//! ```text
//!  submit()                      deliver(Progress)
//!     │                          ┌──────────┐
//!     ▼                          ▼          │
//! ┌───────────┐  Progress  ┌────────────┐   │
//! │ Submitted │ ─────────▶ │ InProgress │ ──┘
//! └─────┬─────┘            └─────┬──────┘
//!       │ Loaded / Failed / Aborted  │
//!       └──────────────┬─────────────┘
//!                      ▼
//!               ┌───────────┐
//!               │ Completed │  entry removed, submit buffer released
//!               └───────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Exactly one of `on_success` / `on_error` fires per request that reaches
//!   a success or failure terminal; none fires for an abort.
//! - Progress callbacks fire only while the handle is registered, so never
//!   after the terminal callback.
//! - The submit-side buffer is released exactly once on every terminal path.
//! - Events for unknown or completed handles are counted and ignored.
//!
//! ## Module Structure
//!
//! ```text
//! fb-02-request-dispatch/
//! ├── domain/      # state machine, success policy, headers, callbacks, entries
//! ├── ports/       # FetchApi / EventSink (inbound), Transport / Clipboard (outbound)
//! ├── service.rs   # FetchBridge: registry + dispatcher
//! └── metrics.rs   # DispatchStats
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    Callbacks, ClipboardError, DispatchConfig, DispatchError, FailureKind, HeaderError,
    HeaderSet, PendingRequestEntry, RequestState, ResponsePayload, SubmitRequest, TargetKind,
    TerminalOutcome,
};
pub use metrics::{DispatchSnapshot, DispatchStats};
pub use ports::{
    copy_to_clipboard, Clipboard, Delivery, EventSink, FetchApi, RecordingClipboard,
    RecordingTransport, StartedRequest, Transport, TransportRequest,
};
pub use service::FetchBridge;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
