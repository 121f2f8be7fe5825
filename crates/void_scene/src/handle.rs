//! Node handles - references into the scene graph
//!
//! A [`NodeHandle`] is a generational index. It is cheap to copy, may be held
//! by any number of owners and may outlive the node it points to. Once the
//! node is destroyed the slot's generation moves on, so a stale handle never
//! aliases a newer node stored in the same slot.
//!
//! A [`NodeId`] is the stable identity token of a scene object. Handles change
//! when a node is destroyed and recreated; ids can be carried over.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Generational reference to a scene node
#[derive(Clone, Copy, PartialOrd, Ord)]
pub struct NodeHandle {
    /// Index into node storage
    index: u32,
    /// Generation to detect stale references
    generation: u32,
}

impl NodeHandle {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Create an invalid/null handle
    #[inline]
    pub const fn null() -> Self {
        Self {
            index: u32::MAX,
            generation: u32::MAX,
        }
    }

    /// Get the storage index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if this is a null handle
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX
    }

    /// Convert to u64 for compact storage
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Create from u64
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl PartialEq for NodeHandle {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl Eq for NodeHandle {}

impl Hash for NodeHandle {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl Default for NodeHandle {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "NodeHandle(null)")
        } else {
            write!(f, "NodeHandle({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index, self.generation)
        }
    }
}

/// Stable identity token of a scene object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_bits_roundtrip() {
        let handle = NodeHandle::new(7, 3);
        let back = NodeHandle::from_bits(handle.to_bits());

        assert_eq!(handle, back);
        assert_eq!(back.index(), 7);
        assert_eq!(back.generation(), 3);
    }

    #[test]
    fn test_null_handle() {
        let handle = NodeHandle::default();
        assert!(handle.is_null());
        assert_eq!(format!("{:?}", handle), "NodeHandle(null)");
        assert!(!NodeHandle::new(0, 0).is_null());
    }
}
