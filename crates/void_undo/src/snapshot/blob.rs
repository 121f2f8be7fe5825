//! Snapshot byte buffer

use std::fmt;

/// Encoded snapshot bytes.
///
/// A blob is either empty or one complete encoding of a subtree. It has a
/// single owner and is not `Clone`; the buffer is freed by [`release`] or
/// when the blob is dropped.
///
/// [`release`]: SnapshotBlob::release
#[derive(Default, PartialEq, Eq)]
pub struct SnapshotBlob {
    bytes: Vec<u8>,
}

impl SnapshotBlob {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drop the contents and give the allocation back.
    pub fn release(&mut self) {
        self.bytes = Vec::new();
    }
}

impl fmt::Debug for SnapshotBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotBlob({} bytes)", self.bytes.len())
    }
}
