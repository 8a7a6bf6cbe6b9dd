//! # Shared Types Crate
//!
//! Types shared by every crate of the fetch bridge.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: handles, user arguments, methods and host
//!   events are defined once, here.
//! - **Opaque Identity**: a `RequestHandle` is the only way any component
//!   refers to an in-flight request; a `UserArg` is never inspected.
//! - **Owned Payloads**: every `HostEvent` owns its data so it can cross a
//!   task or channel boundary without borrowing host memory.

pub mod entities;
pub mod errors;
pub mod events;
pub mod status;

pub use entities::*;
pub use errors::*;
pub use events::*;
