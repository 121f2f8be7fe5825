//! Error types for snapshot commands

use thiserror::Error;
use void_scene::{NodeHandle, NodeId, SceneError};

use crate::commands::RecordState;

/// Snapshot and command errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A live node could not be encoded. The capture is aborted.
    #[error("Failed to serialize '{node}': {reason}")]
    Serialization { node: String, reason: String },

    /// A stored snapshot could not be decoded, or does not match its recorded topology
    #[error("Corrupt snapshot: {0}")]
    CorruptBlob(String),

    /// The recorded parent is gone. Handled during reattachment by falling
    /// back to the nearest surviving ancestor; only ever logged.
    #[error("Recorded parent {parent} no longer exists")]
    DanglingParent { parent: NodeId },

    /// A command was driven through a transition its state does not allow
    #[error("Cannot {operation} a command in state {state:?}")]
    InvalidStateTransition {
        state: RecordState,
        operation: &'static str,
    },

    /// The recorded scene object no longer exists
    #[error("Target scene object {0:?} has been destroyed")]
    TargetDestroyed(NodeHandle),

    /// Scene graph operation failed
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;
