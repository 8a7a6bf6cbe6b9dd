//! # Domain Module
//!
//! Core types for the registry and dispatcher. No I/O.

pub mod callbacks;
pub mod config;
pub mod entry;
pub mod errors;
pub mod headers;
pub mod policy;
pub mod state;

pub use callbacks::*;
pub use config::*;
pub use entry::*;
pub use errors::*;
pub use headers::*;
pub use policy::*;
pub use state::*;
