//! # Domain Module
//!
//! Buffer types, limits and allocation errors.

pub mod buffer;
pub mod errors;
pub mod limits;

pub use buffer::*;
pub use errors::*;
pub use limits::*;
