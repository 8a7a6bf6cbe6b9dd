//! Per-side allocation ceilings.

use serde::{Deserialize, Serialize};

use super::buffer::BufferSide;

/// Upper bounds on relay allocations. `0` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayLimits {
    /// Max submit-side copy in bytes.
    pub max_request_bytes: usize,
    /// Max response-side copy in bytes.
    pub max_response_bytes: usize,
}

impl RelayLimits {
    /// No ceilings at all.
    pub const UNLIMITED: Self = Self {
        max_request_bytes: 0,
        max_response_bytes: 0,
    };

    /// Ceiling for one side, `None` when unlimited.
    pub fn limit_for(&self, side: BufferSide) -> Option<usize> {
        let limit = match side {
            BufferSide::Submit => self.max_request_bytes,
            BufferSide::Response => self.max_response_bytes,
        };
        (limit != 0).then_some(limit)
    }
}

impl Default for RelayLimits {
    fn default() -> Self {
        Self {
            max_request_bytes: 16 * 1024 * 1024,
            max_response_bytes: 256 * 1024 * 1024,
        }
    }
}
