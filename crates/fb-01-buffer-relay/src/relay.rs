//! # Buffer Relay
//!
//! Sole allocator and releaser of cross-boundary buffers. Keeps a ledger of
//! every buffer it currently owns so callers can verify that all copies were
//! released once their requests terminated.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::{
    AllocationError, AllocationFailure, BufferId, BufferSide, OwnedBuffer, RelayLimits,
};

/// Relay counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Successful submit-side copies.
    pub copies_in: u64,
    /// Successful response-side copies.
    pub copies_out: u64,
    /// Buffers released by the relay.
    pub releases: u64,
    /// Response buffers whose ownership passed to the caller.
    pub hand_offs: u64,
    /// Copies that failed to allocate.
    pub allocation_failures: u64,
    /// Total bytes copied in.
    pub bytes_in: u64,
    /// Total bytes copied out.
    pub bytes_out: u64,
}

/// Buffer relay with a live-buffer ledger.
#[derive(Debug)]
pub struct BufferRelay {
    limits: RelayLimits,
    next_id: u64,
    live: HashMap<BufferId, (BufferSide, usize)>,
    live_bytes: usize,
    stats: RelayStats,
}

impl BufferRelay {
    /// Create a relay with the given limits.
    pub fn new(limits: RelayLimits) -> Self {
        Self {
            limits,
            next_id: 1,
            live: HashMap::new(),
            live_bytes: 0,
            stats: RelayStats::default(),
        }
    }

    /// Copy a caller-owned byte range into a bridge-owned buffer.
    ///
    /// The caller may mutate or free `source` as soon as this returns.
    pub fn copy_in(&mut self, source: &[u8]) -> Result<OwnedBuffer, AllocationError> {
        let buf = self.copy(BufferSide::Submit, source)?;
        self.stats.copies_in += 1;
        self.stats.bytes_in += buf.len() as u64;
        Ok(buf)
    }

    /// Copy a host-owned response into a buffer the caller can be handed.
    pub fn copy_out(&mut self, response: &[u8]) -> Result<OwnedBuffer, AllocationError> {
        let buf = self.copy(BufferSide::Response, response)?;
        self.stats.copies_out += 1;
        self.stats.bytes_out += buf.len() as u64;
        Ok(buf)
    }

    /// Release a buffer the relay owns.
    ///
    /// Taking the buffer by value makes a second release of the same buffer
    /// impossible; the ledger check only guards against buffers from another
    /// relay.
    pub fn release(&mut self, buf: OwnedBuffer) {
        let known = self.forget(&buf);
        debug_assert!(known, "released {} not owned by this relay", buf.id());
        self.stats.releases += 1;
        debug!(buffer = %buf.id(), side = %buf.side(), len = buf.len(), "Buffer released");
    }

    /// Pass ownership of a buffer to the caller. The relay stops tracking it
    /// and never touches it again.
    pub fn hand_off(&mut self, buf: OwnedBuffer) -> OwnedBuffer {
        let known = self.forget(&buf);
        debug_assert!(known, "handed off {} not owned by this relay", buf.id());
        self.stats.hand_offs += 1;
        debug!(buffer = %buf.id(), len = buf.len(), "Buffer ownership handed to caller");
        buf
    }

    /// Number of buffers currently owned by the relay.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Bytes currently held in relay-owned buffers.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    /// Whether a buffer is still owned by the relay.
    pub fn is_live(&self, id: BufferId) -> bool {
        self.live.contains_key(&id)
    }

    /// Counters since creation.
    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    /// Configured limits.
    pub fn limits(&self) -> RelayLimits {
        self.limits
    }

    fn copy(&mut self, side: BufferSide, source: &[u8]) -> Result<OwnedBuffer, AllocationError> {
        let requested = source.len();
        if let Some(limit) = self.limits.limit_for(side) {
            if requested > limit {
                return Err(self.fail(side, requested, AllocationFailure::LimitExceeded { limit }));
            }
        }

        let mut bytes = Vec::new();
        if bytes.try_reserve_exact(requested).is_err() {
            return Err(self.fail(side, requested, AllocationFailure::OutOfMemory));
        }
        bytes.extend_from_slice(source);

        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, (side, requested));
        self.live_bytes += requested;

        debug!(buffer = %id, side = %side, len = requested, "Buffer allocated");
        Ok(OwnedBuffer::new(id, side, bytes))
    }

    fn fail(&mut self, side: BufferSide, requested: usize, reason: AllocationFailure) -> AllocationError {
        self.stats.allocation_failures += 1;
        let err = AllocationError {
            side,
            requested,
            reason,
        };
        warn!(error = %err, "Buffer allocation failed");
        err
    }

    fn forget(&mut self, buf: &OwnedBuffer) -> bool {
        match self.live.remove(&buf.id()) {
            Some((_, len)) => {
                self.live_bytes -= len;
                true
            }
            None => false,
        }
    }
}

impl Default for BufferRelay {
    fn default() -> Self {
        Self::new(RelayLimits::default())
    }
}
