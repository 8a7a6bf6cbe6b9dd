//! Dispatcher configuration.

use fb_01_buffer_relay::RelayLimits;
use serde::{Deserialize, Serialize};

/// Registry and relay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Buffer ceilings.
    pub relay: RelayLimits,
    /// Max simultaneously pending requests. `0` means unlimited.
    pub max_pending: usize,
}

impl DispatchConfig {
    /// Registry ceiling, `None` when unlimited.
    pub fn pending_limit(&self) -> Option<usize> {
        (self.max_pending != 0).then_some(self.max_pending)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            relay: RelayLimits::default(),
            max_pending: 1024,
        }
    }
}
