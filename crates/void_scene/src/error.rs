//! Error types for scene graph operations

use thiserror::Error;

use crate::component::ComponentKind;
use crate::handle::NodeHandle;

/// Scene graph errors
#[derive(Debug, Clone, Error)]
pub enum SceneError {
    /// Handle is stale or null
    #[error("Scene node not found: {0:?}")]
    NodeNotFound(NodeHandle),

    /// Parenting would make a node its own ancestor
    #[error("Cycle detected: {parent:?} is a descendant of {child:?}")]
    CycleDetected { child: NodeHandle, parent: NodeHandle },

    /// Parent handle does not refer to a live node
    #[error("Invalid parent {parent:?} for child {child:?}")]
    InvalidParent { child: NodeHandle, parent: NodeHandle },

    /// A component refused to be serialized
    #[error("{kind} component cannot be serialized: {reason}")]
    UnserializableComponent { kind: ComponentKind, reason: String },
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
