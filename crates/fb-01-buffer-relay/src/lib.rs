//! # FB-01 Buffer Relay
//!
//! Moves bytes across the ownership boundary between the native caller and
//! the bridge without ever sharing a live pointer between the two owners.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (domain types + relay service)
//!
//! ## Ownership Rules
//!
//! | Direction | Operation | Owner afterwards |
//! |-----------|-----------|------------------|
//! | caller -> bridge | `copy_in` | pending request entry, until terminal cleanup |
//! | host -> caller | `copy_out` | relay, until `release` or `hand_off` |
//! | bridge -> nowhere | `release` | nobody (buffer dropped) |
//! | bridge -> caller | `hand_off` | caller |
//!
//! `OwnedBuffer` is not `Clone`; `release` and `hand_off` take it by value,
//! so releasing the same buffer twice does not compile.
//!
//! ## Module Structure
//!
//! ```text
//! fb-01-buffer-relay/
//! ├── domain/     # OwnedBuffer, BufferId, RelayLimits, AllocationError
//! └── relay.rs    # BufferRelay: copy_in / copy_out / release / hand_off + ledger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod relay;

pub use domain::{
    AllocationError, AllocationFailure, BufferId, BufferSide, OwnedBuffer, RelayLimits,
};
pub use relay::{BufferRelay, RelayStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
