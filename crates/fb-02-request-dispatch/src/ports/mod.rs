//! Ports layer for the Request Dispatch subsystem.
//!
//! - Inbound (Driving): the caller-facing `FetchApi` and the host-facing
//!   `EventSink`
//! - Outbound (Driven): the `Transport` that performs I/O and the
//!   fire-and-forget `Clipboard`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
