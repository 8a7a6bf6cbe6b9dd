//! # Owned Buffers
//!
//! A buffer owned by exactly one party at a time.

use std::fmt;

/// Relay-assigned identity of a buffer, unique per relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) u64);

impl BufferId {
    /// Raw id value.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf-{}", self.0)
    }
}

/// Which side of the boundary a buffer was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSide {
    /// Copy of a caller request payload.
    Submit,
    /// Copy of a host response payload.
    Response,
}

impl fmt::Display for BufferSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => f.write_str("submit"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// Independently owned copy of a byte range.
///
/// Deliberately not `Clone`: ownership moves, it is never shared.
pub struct OwnedBuffer {
    id: BufferId,
    side: BufferSide,
    bytes: Vec<u8>,
}

impl OwnedBuffer {
    pub(crate) fn new(id: BufferId, side: BufferSide, bytes: Vec<u8>) -> Self {
        Self { id, side, bytes }
    }

    /// Buffer identity.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Side the buffer was copied from.
    pub fn side(&self) -> BufferSide {
        self.side
    }

    /// Buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the bytes out, consuming the buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for OwnedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for OwnedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("id", &self.id)
            .field("side", &self.side)
            .field("len", &self.bytes.len())
            .finish()
    }
}
