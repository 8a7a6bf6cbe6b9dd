//! # Bridge Runtime
//!
//! Host side of the fetch bridge: the concrete transport, the clipboard
//! adapter, configuration and the event loop that feeds transport events
//! back into the dispatcher.
//!
//! ## Wiring
//!
//! ```text
//!  caller ──submit()──▶ HostLoop ──▶ FetchBridge ──start()──▶ HttpTransport
//!                          ▲                                      │
//!                          │          mpsc::UnboundedSender       │ tokio tasks
//!                          └──────────── HostEvent ◀──────────────┘
//!                    deliver() on one task, callbacks run here
//! ```
//!
//! Transport tasks run concurrently, but every event passes through a single
//! receiver, so callbacks for a handle never race each other.
//!
//! ## Targets
//!
//! - `http://` and `https://` URLs go through `reqwest`.
//! - Anything else is a path under `transport.local_root`, read with
//!   `tokio::fs`. Absolute paths and `..` segments are refused at submit.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod config;
pub mod error;
pub mod host;

pub use adapters::{resolve_local, ClipboardCommand, CommandClipboard, HttpTransport};
pub use config::{ConfigError, RuntimeConfig, TransportConfig};
pub use error::RuntimeError;
pub use host::HostLoop;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
