//! # Domain Errors

use thiserror::Error;

use super::buffer::BufferSide;

/// Why an allocation could not be performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationFailure {
    /// The requested size exceeds the configured per-side limit.
    LimitExceeded {
        /// Configured limit in bytes.
        limit: usize,
    },
    /// The allocator refused the reservation.
    OutOfMemory,
}

/// Copy-in or copy-out could not allocate its destination buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{side} buffer allocation of {requested} bytes failed: {}", describe(.reason))]
pub struct AllocationError {
    /// Side the copy was for.
    pub side: BufferSide,
    /// Requested size in bytes.
    pub requested: usize,
    /// Failure reason.
    pub reason: AllocationFailure,
}

fn describe(reason: &AllocationFailure) -> String {
    match reason {
        AllocationFailure::LimitExceeded { limit } => format!("exceeds limit of {} bytes", limit),
        AllocationFailure::OutOfMemory => "out of memory".to_string(),
    }
}
