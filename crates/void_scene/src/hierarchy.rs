//! Hierarchy queries and edits
//!
//! All edits validate their inputs and refuse to create cycles. A node is
//! either attached (it has a parent, or it is listed at the root level) or
//! detached (freshly instantiated, or explicitly detached) and invisible to
//! the scene until it is attached again.

use crate::error::{Result, SceneError};
use crate::graph::SceneGraph;
use crate::handle::NodeHandle;

impl SceneGraph {
    /// Parent of a node. `None` for root-level, detached or dead nodes.
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    /// Children of a node in sibling order. Empty for dead nodes.
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes
            .get(handle)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Position of a node among its siblings (or among the root level).
    pub fn child_index(&self, handle: NodeHandle) -> Option<usize> {
        let siblings = match self.parent(handle) {
            Some(parent) => self.children(parent),
            None => self.roots.as_slice(),
        };
        siblings.iter().position(|&h| h == handle)
    }

    /// Whether a node is part of the scene hierarchy.
    pub fn is_attached(&self, handle: NodeHandle) -> bool {
        self.parent(handle).is_some() || (self.is_alive(handle) && self.roots.contains(&handle))
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(handle);
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.parent(parent);
        }
        ancestors
    }

    /// Descendants of a node in depth-first pre-order, excluding the node.
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut descendants = Vec::new();
        self.collect_descendants(handle, &mut descendants);
        descendants
    }

    fn collect_descendants(&self, handle: NodeHandle, out: &mut Vec<NodeHandle>) {
        for &child in self.children(handle) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Check if `ancestor` is somewhere above `handle`.
    pub fn is_ancestor(&self, handle: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut current = self.parent(handle);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Topmost ancestor of a node (the node itself if it has no parent).
    pub fn get_root(&self, handle: NodeHandle) -> NodeHandle {
        self.ancestors(handle).last().copied().unwrap_or(handle)
    }

    /// Attach `child` under `parent` (or at the root level when `None`) at
    /// sibling position `index`. Indices past the end append.
    ///
    /// # Errors
    ///
    /// - `child` is dead
    /// - `parent` is dead
    /// - `parent` is `child` or one of its descendants
    pub fn attach(&mut self, child: NodeHandle, parent: Option<NodeHandle>, index: usize) -> Result<()> {
        if !self.is_alive(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if let Some(parent) = parent {
            if !self.is_alive(parent) {
                return Err(SceneError::InvalidParent { child, parent });
            }
            if parent == child || self.is_ancestor(parent, child) {
                return Err(SceneError::CycleDetected { child, parent });
            }
        }

        self.unlink(child);

        let siblings = match parent {
            Some(parent) => match self.nodes.get_mut(parent) {
                Some(node) => &mut node.children,
                None => return Err(SceneError::InvalidParent { child, parent }),
            },
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, child);

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = parent;
        }
        Ok(())
    }

    /// Attach `child` as the last child of `parent` (or last root).
    pub fn set_parent(&mut self, child: NodeHandle, parent: Option<NodeHandle>) -> Result<()> {
        self.attach(child, parent, usize::MAX)
    }

    /// Take a node (and its subtree) out of the hierarchy without destroying it.
    pub fn detach(&mut self, handle: NodeHandle) -> Result<()> {
        if !self.is_alive(handle) {
            return Err(SceneError::NodeNotFound(handle));
        }
        self.unlink(handle);
        Ok(())
    }

    fn unlink(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get_mut(handle) else {
            return;
        };
        match node.parent.take() {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.children.retain(|&h| h != handle);
                }
            }
            None => self.roots.retain(|&h| h != handle),
        }
    }

    /// Destroy a node and all of its descendants.
    ///
    /// Descendants go deepest first so parents are still alive while their
    /// children are removed. Returns the number of destroyed nodes.
    pub fn destroy(&mut self, handle: NodeHandle) -> Result<usize> {
        if !self.is_alive(handle) {
            return Err(SceneError::NodeNotFound(handle));
        }

        self.unlink(handle);

        let mut doomed = vec![handle];
        doomed.extend(self.descendants(handle));
        for &node in doomed.iter().rev() {
            self.free(node);
        }

        log::debug!("Destroyed {} scene node(s) rooted at {}", doomed.len(), handle);
        Ok(doomed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (SceneGraph, NodeHandle, NodeHandle, NodeHandle, NodeHandle) {
        let mut graph = SceneGraph::new();
        let root = graph.spawn("Root");
        let a = graph.spawn_child(root, "A").unwrap();
        let b = graph.spawn_child(root, "B").unwrap();
        let a1 = graph.spawn_child(a, "A1").unwrap();
        (graph, root, a, b, a1)
    }

    #[test]
    fn test_attach_at_index() {
        let (mut graph, root, a, b, a1) = sample();

        graph.attach(a1, Some(root), 1).unwrap();
        assert_eq!(graph.children(root), &[a, a1, b]);
        assert!(graph.children(a).is_empty());
        assert_eq!(graph.child_index(a1), Some(1));

        // Out-of-range indices append
        graph.attach(a, Some(root), 99).unwrap();
        assert_eq!(graph.children(root), &[a1, b, a]);
    }

    #[test]
    fn test_cycle_detection() {
        let (mut graph, root, a, _b, a1) = sample();

        assert!(matches!(
            graph.attach(root, Some(a1), 0),
            Err(SceneError::CycleDetected { .. })
        ));
        assert!(matches!(
            graph.set_parent(a, Some(a)),
            Err(SceneError::CycleDetected { .. })
        ));
        // Nothing moved
        assert_eq!(graph.parent(a1), Some(a));
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let (graph, root, a, b, a1) = sample();

        assert_eq!(graph.ancestors(a1), vec![a, root]);
        assert_eq!(graph.descendants(root), vec![a, a1, b]);
        assert!(graph.is_ancestor(a1, root));
        assert!(!graph.is_ancestor(b, a));
        assert_eq!(graph.get_root(a1), root);
    }

    #[test]
    fn test_detach_and_root_level() {
        let (mut graph, root, a, b, _a1) = sample();

        graph.detach(a).unwrap();
        assert!(!graph.is_attached(a));
        assert_eq!(graph.children(root), &[b]);

        graph.attach(a, None, 0).unwrap();
        assert!(graph.is_attached(a));
        assert_eq!(graph.roots(), &[a, root]);
        assert_eq!(graph.child_index(a), Some(0));
    }

    #[test]
    fn test_destroy_recursive() {
        let (mut graph, root, a, b, a1) = sample();

        assert_eq!(graph.destroy(a).unwrap(), 2);
        assert!(graph.is_destroyed(a));
        assert!(graph.is_destroyed(a1));
        assert!(graph.is_alive(b));
        assert_eq!(graph.children(root), &[b]);
        assert_eq!(graph.len(), 2);

        assert!(graph.destroy(a).is_err());
    }
}
