//! Scene node data
//!
//! [`SceneNode`] is a node as it lives inside the graph, linked to its parent
//! and children by handle. [`SceneNodeData`] is the same content detached from
//! any graph: an owned tree that can be serialized, inspected and later
//! instantiated back into a graph.

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentKind};
use crate::handle::{NodeHandle, NodeId};

/// Transform relative to the parent node (or the scene root)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation offset in parent space
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w] (unit quaternion)
    pub rotation: [f32; 4],
    /// Scale factors
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale)
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Create from translation only
    pub fn from_translation(translation: [f32; 3]) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Create from translation, rotation, and scale
    pub fn new(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Check all fields are finite
    pub fn is_finite(&self) -> bool {
        self.translation
            .iter()
            .chain(self.rotation.iter())
            .chain(self.scale.iter())
            .all(|c| c.is_finite())
    }

    /// Bit patterns of every field, for exact comparisons
    pub fn to_bits(&self) -> [u32; 10] {
        let mut bits = [0u32; 10];
        let fields = self
            .translation
            .iter()
            .chain(self.rotation.iter())
            .chain(self.scale.iter());
        for (slot, value) in bits.iter_mut().zip(fields) {
            *slot = value.to_bits();
        }
        bits
    }
}

/// A node living inside a [`SceneGraph`](crate::SceneGraph)
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Identity token
    pub(crate) id: NodeId,
    /// Display name
    pub name: String,
    /// Local transform
    pub transform: Transform,
    /// Whether the node takes part in the scene
    pub active: bool,
    /// Attached components, in attachment order
    pub components: Vec<Component>,
    /// Parent node, `None` for root-level or detached nodes
    pub(crate) parent: Option<NodeHandle>,
    /// Children in sibling order
    pub(crate) children: Vec<NodeHandle>,
}

impl SceneNode {
    pub(crate) fn new(id: NodeId, name: String) -> Self {
        Self {
            id,
            name,
            transform: Transform::IDENTITY,
            active: true,
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// First component of the given kind
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.kind() == kind)
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Remove every component of the given kind, returning how many were removed
    pub fn remove_components(&mut self, kind: ComponentKind) -> usize {
        let before = self.components.len();
        self.components.retain(|c| c.kind() != kind);
        before - self.components.len()
    }
}

/// Detached, owned copy of a node and (optionally) its subtree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNodeData {
    pub name: String,
    pub transform: Transform,
    pub active: bool,
    pub components: Vec<Component>,
    /// Children in sibling order
    pub children: Vec<SceneNodeData>,
}

impl SceneNodeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            active: true,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_child(mut self, child: SceneNodeData) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including the root
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNodeData::node_count).sum::<usize>()
    }

    /// Height of this subtree; a lone node has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(SceneNodeData::depth).max().unwrap_or(0)
    }

    /// Visit every node in depth-first pre-order
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a SceneNodeData)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}
