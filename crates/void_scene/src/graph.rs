//! Scene graph storage and node access
//!
//! The graph owns every node. Callers hold [`NodeHandle`]s, which stay
//! copyable after the node is gone; every accessor checks liveness instead
//! of assuming it.

use std::collections::HashMap;

use crate::error::{Result, SceneError};
use crate::handle::{NodeHandle, NodeId};
use crate::node::{SceneNode, SceneNodeData};
use crate::storage::NodeStorage;

/// The live scene graph
pub struct SceneGraph {
    pub(crate) nodes: NodeStorage<SceneNode>,
    /// Root-level nodes in sibling order
    pub(crate) roots: Vec<NodeHandle>,
    /// Identity token lookup
    ids: HashMap<NodeId, NodeHandle>,
    next_id: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: NodeStorage::new(),
            roots: Vec::new(),
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    /// Spawn a new node at the end of the root level.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeHandle {
        let handle = self.spawn_detached(name.into());
        self.roots.push(handle);
        handle
    }

    /// Spawn a new node as the last child of `parent`.
    pub fn spawn_child(&mut self, parent: NodeHandle, name: impl Into<String>) -> Result<NodeHandle> {
        if !self.is_alive(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let handle = self.spawn_detached(name.into());
        if let Some(node) = self.nodes.get_mut(handle) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(handle);
        }
        Ok(handle)
    }

    fn spawn_detached(&mut self, name: String) -> NodeHandle {
        let id = self.alloc_id();
        let handle = self.nodes.insert(SceneNode::new(id, name));
        self.ids.insert(id, handle);
        handle
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn is_alive(&self, handle: NodeHandle) -> bool {
        self.nodes.contains(handle)
    }

    /// True once the node behind `handle` has been destroyed (or never existed).
    #[inline]
    pub fn is_destroyed(&self, handle: NodeHandle) -> bool {
        !self.is_alive(handle)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(handle)
    }

    pub(crate) fn node(&self, handle: NodeHandle) -> Result<&SceneNode> {
        self.nodes.get(handle).ok_or(SceneError::NodeNotFound(handle))
    }

    /// Number of live nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Root-level nodes in sibling order
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// Iterate over every live node handle
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes.handles()
    }

    /// Resolve an identity token to the node currently carrying it
    pub fn find(&self, id: NodeId) -> Option<NodeHandle> {
        self.ids
            .get(&id)
            .copied()
            .filter(|&handle| self.is_alive(handle))
    }

    /// First live node with the given name, in storage order
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .handles()
            .find(|&h| self.nodes.get(h).map(|n| n.name == name).unwrap_or(false))
    }

    pub fn id_of(&self, handle: NodeHandle) -> Option<NodeId> {
        self.nodes.get(handle).map(|n| n.id)
    }

    /// Give `handle` the identity token `id`.
    ///
    /// Returns `Ok(false)` and leaves the node unchanged when another live
    /// node already carries `id`.
    pub fn assign_id(&mut self, handle: NodeHandle, id: NodeId) -> Result<bool> {
        let current = self.node(handle)?.id;
        if current == id {
            return Ok(true);
        }
        if self.find(id).is_some() {
            return Ok(false);
        }

        self.ids.remove(&current);
        self.ids.insert(id, handle);
        if let Some(node) = self.nodes.get_mut(handle) {
            node.id = id;
        }
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(true)
    }

    /// Copy a node's content into a detached tree.
    ///
    /// With `deep` set the whole subtree is copied, otherwise only the node.
    pub fn snapshot_data(&self, handle: NodeHandle, deep: bool) -> Result<SceneNodeData> {
        let node = self.node(handle)?;
        let children = if deep {
            node.children
                .iter()
                .map(|&child| self.snapshot_data(child, true))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        Ok(SceneNodeData {
            name: node.name.clone(),
            transform: node.transform,
            active: node.active,
            components: node.components.clone(),
            children,
        })
    }

    /// Create live nodes from a detached tree.
    ///
    /// The new subtree gets fresh identity tokens and is left detached: it
    /// has no parent and is not part of the root level until attached.
    pub fn instantiate(&mut self, data: &SceneNodeData) -> NodeHandle {
        let handle = self.spawn_detached(data.name.clone());
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform = data.transform;
            node.active = data.active;
            node.components = data.components.clone();
        }

        for child_data in &data.children {
            let child = self.instantiate(child_data);
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(handle);
            }
            if let Some(node) = self.nodes.get_mut(handle) {
                node.children.push(child);
            }
        }

        handle
    }

    /// Remove a node from storage and the id map, without touching links.
    pub(crate) fn free(&mut self, handle: NodeHandle) -> Option<SceneNode> {
        let node = self.nodes.remove(handle)?;
        if self.ids.get(&node.id) == Some(&handle) {
            self.ids.remove(&node.id);
        }
        Some(node)
    }
}
