//! Topology proxy
//!
//! A structural record of where a captured subtree sat in the hierarchy and
//! which identity tokens its nodes carried. The codec only stores content;
//! the proxy puts restored content back in the same place under the same
//! identities.

use std::iter;

use void_scene::{NodeHandle, NodeId, SceneGraph, SceneNodeData};

use crate::error::{Result, SnapshotError};

/// One captured node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyEntry {
    /// Identity token at capture time
    pub id: NodeId,
    /// Parent's identity token, `None` at the root level
    pub parent: Option<NodeId>,
    /// Position among siblings
    pub ordinal: usize,
    /// Number of children at capture time
    pub child_count: usize,
}

/// Where a restored subtree ended up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reattachment {
    /// Parent the root was attached under, `None` for the root level
    pub parent: Option<NodeHandle>,
    /// Sibling position it was inserted at (clamped to the sibling count)
    pub ordinal: usize,
    /// Recorded parent that no longer existed, if a fallback was needed
    pub dangling: Option<NodeId>,
    /// Whether the subtree was attached at all
    pub attached: bool,
}

/// Structural record of a captured subtree
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopologyProxy {
    /// Ancestors of the captured root, nearest first
    ancestors: Vec<ProxyEntry>,
    /// Captured nodes in depth-first pre-order, root first
    nodes: Vec<ProxyEntry>,
    /// Whether descendants were captured
    hierarchy: bool,
    /// Whether the root was part of the hierarchy at capture time
    attached: bool,
}

impl TopologyProxy {
    /// Record the position of `node` and, with `record_hierarchy`, of every
    /// descendant.
    pub fn capture(graph: &SceneGraph, node: NodeHandle, record_hierarchy: bool) -> Result<Self> {
        let root = entry(graph, node)?;

        let ancestors = graph
            .ancestors(node)
            .into_iter()
            .map(|h| entry(graph, h))
            .collect::<Result<Vec<_>>>()?;

        let mut nodes = vec![root];
        if record_hierarchy {
            for descendant in graph.descendants(node) {
                nodes.push(entry(graph, descendant)?);
            }
        } else {
            nodes[0].child_count = 0;
        }

        Ok(Self {
            ancestors,
            nodes,
            hierarchy: record_hierarchy,
            attached: graph.is_attached(node),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of captured nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn records_hierarchy(&self) -> bool {
        self.hierarchy
    }

    /// Captured root entry
    pub fn root(&self) -> Option<&ProxyEntry> {
        self.nodes.first()
    }

    pub fn entries(&self) -> &[ProxyEntry] {
        &self.nodes
    }

    pub fn ancestors(&self) -> &[ProxyEntry] {
        &self.ancestors
    }

    /// Check that a decoded tree has exactly the recorded shape.
    pub fn check(&self, data: &SceneNodeData) -> Result<()> {
        let mut shape = Vec::with_capacity(self.nodes.len());
        data.visit(&mut |node| shape.push(node.children.len()));

        let recorded = self.nodes.iter().map(|e| e.child_count);
        if shape.len() != self.nodes.len() || !shape.iter().copied().eq(recorded) {
            return Err(SnapshotError::CorruptBlob(format!(
                "snapshot of {} node(s) does not match the {} recorded",
                shape.len(),
                self.nodes.len()
            )));
        }
        Ok(())
    }

    /// Give a freshly decoded subtree its recorded identities and attach it
    /// where the captured root used to be.
    ///
    /// When the recorded parent is gone or cut off from the scene, the root
    /// goes under the nearest recorded ancestor still in the hierarchy, at
    /// the position the vanished branch had, or at the root level if no
    /// ancestor survived.
    pub fn reattach(&self, graph: &mut SceneGraph, root: NodeHandle) -> Result<Reattachment> {
        let Some(root_entry) = self.nodes.first() else {
            return Err(SnapshotError::CorruptBlob("empty topology record".into()));
        };

        let handles: Vec<NodeHandle> = iter::once(root).chain(graph.descendants(root)).collect();
        if handles.len() != self.nodes.len() {
            return Err(SnapshotError::CorruptBlob(format!(
                "restored subtree has {} node(s), {} recorded",
                handles.len(),
                self.nodes.len()
            )));
        }

        for (&handle, entry) in handles.iter().zip(&self.nodes) {
            if !graph.assign_id(handle, entry.id)? {
                log::debug!(
                    "Identity {} is held by another node; restored {} keeps a fresh one",
                    entry.id,
                    handle
                );
            }
        }

        if !self.attached {
            return Ok(Reattachment {
                parent: None,
                ordinal: 0,
                dangling: None,
                attached: false,
            });
        }

        let (parent, ordinal, fell_back) = self.resolve_parent(graph);
        let dangling = if fell_back { root_entry.parent } else { None };
        if let Some(parent_id) = dangling {
            log::warn!(
                "{}; reattaching under {}",
                SnapshotError::DanglingParent { parent: parent_id },
                parent.map(|p| p.to_string()).unwrap_or_else(|| "scene root".into())
            );
        }

        graph.attach(root, parent, ordinal)?;
        Ok(Reattachment {
            parent,
            ordinal: graph.child_index(root).unwrap_or(ordinal),
            dangling,
            attached: true,
        })
    }

    /// Walk the recorded chain from the root upward until an entry whose
    /// parent still exists in the hierarchy (or that was at the root level).
    fn resolve_parent(&self, graph: &SceneGraph) -> (Option<NodeHandle>, usize, bool) {
        let chain = self.nodes.iter().take(1).chain(self.ancestors.iter());
        for (depth, entry) in chain.enumerate() {
            match entry.parent {
                None => return (None, entry.ordinal, depth > 0),
                Some(parent_id) => {
                    // A parent cut off from the scene would hide the restored node
                    let visible = graph
                        .find(parent_id)
                        .filter(|&p| graph.is_attached(graph.get_root(p)));
                    if let Some(parent) = visible {
                        return (Some(parent), entry.ordinal, depth > 0);
                    }
                }
            }
        }
        (None, usize::MAX, true)
    }
}

fn entry(graph: &SceneGraph, handle: NodeHandle) -> Result<ProxyEntry> {
    let node = graph
        .get(handle)
        .ok_or(SnapshotError::TargetDestroyed(handle))?;
    Ok(ProxyEntry {
        id: node.id(),
        parent: node.parent().and_then(|p| graph.id_of(p)),
        ordinal: graph.child_index(handle).unwrap_or(0),
        child_count: node.children().len(),
    })
}
