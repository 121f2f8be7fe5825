//! Void Scene - Live Scene Graph
//!
//! The scene graph edited by the Void editor: a tree of named nodes with
//! transforms and attached components.
//!
//! # Features
//!
//! - Generational [`NodeHandle`]s that detect use-after-destroy
//! - Stable [`NodeId`] identity tokens that can be carried across recreation
//! - Ordered children with validated, cycle-free reparenting
//! - Detached [`SceneNodeData`] copies for snapshotting and instantiation
//!
//! # Example
//!
//! ```ignore
//! use void_scene::prelude::*;
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.spawn("Level");
//! let lamp = graph.spawn_child(root, "Lamp")?;
//! graph.get_mut(lamp).unwrap().add_component(Component::point_light([1.0; 3], 4.0, 10.0));
//!
//! graph.destroy(root)?;
//! assert!(graph.is_destroyed(lamp));
//! ```

pub mod component;
pub mod error;
pub mod graph;
pub mod handle;
pub mod hierarchy;
pub mod node;
mod storage;

pub mod prelude {
    pub use crate::component::{ColliderShape, Component, ComponentKind, FieldValue, LightKind};
    pub use crate::error::{Result, SceneError};
    pub use crate::graph::SceneGraph;
    pub use crate::handle::{NodeHandle, NodeId};
    pub use crate::node::{SceneNode, SceneNodeData, Transform};
}

pub use prelude::*;
