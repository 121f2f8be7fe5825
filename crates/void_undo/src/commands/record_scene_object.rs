//! Snapshot command for arbitrary scene object edits.
//!
//! The command does not know what the edit is. It captures the target (and
//! optionally its subtree) before the caller changes anything, and restores
//! that capture on revert. Every restore first captures the current state,
//! so the same mechanism re-applies the edit on commit.

use void_scene::{NodeHandle, NodeId, SceneGraph};

use crate::commands::{CommandResult, EditorCommand};
use crate::error::{Result, SnapshotError};
use crate::history::UndoRedo;
use crate::snapshot::{SceneSnapshotCodec, SnapshotBlob, TopologyProxy};

/// Lifecycle state of a [`RecordSceneObjectCommand`].
///
/// In `Captured` and `Committed` the graph shows the edited state and the
/// snapshot holds the state before the edit. In `Reverted` it is the other
/// way around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordState {
    /// Nothing captured
    Empty,
    /// Captured, not yet committed
    Captured,
    Committed,
    Reverted,
}

/// Records a scene object so an edit made to it can be undone and redone.
pub struct RecordSceneObjectCommand {
    description: String,
    target: NodeHandle,
    /// Identity of the target at capture time, used once `target` goes stale
    target_id: Option<NodeId>,
    record_hierarchy: bool,
    proxy: TopologyProxy,
    blob: SnapshotBlob,
    state: RecordState,
    codec: SceneSnapshotCodec,
}

impl RecordSceneObjectCommand {
    pub const DEFAULT_DESCRIPTION: &'static str = "Record Scene Object";

    /// Create an empty command for `target`. Nothing is captured until
    /// [`rerecord`](Self::rerecord) is called.
    pub fn new(target: NodeHandle, record_hierarchy: bool, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            description: if description.is_empty() {
                Self::DEFAULT_DESCRIPTION.to_string()
            } else {
                description
            },
            target,
            target_id: None,
            record_hierarchy,
            proxy: TopologyProxy::default(),
            blob: SnapshotBlob::empty(),
            state: RecordState::Empty,
            codec: SceneSnapshotCodec::default(),
        }
    }

    pub fn with_codec(mut self, codec: SceneSnapshotCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Capture `node` and register the command with `history`.
    ///
    /// Call this right before editing the object. The graph is not touched;
    /// the caller makes the edit afterwards. On failure nothing is
    /// registered.
    pub fn execute(
        history: &mut UndoRedo,
        graph: &SceneGraph,
        node: NodeHandle,
        record_hierarchy: bool,
        description: &str,
    ) -> Result<()> {
        let mut command = Self::new(node, record_hierarchy, description).with_codec(history.codec().clone());
        command.record(graph)?;
        history.register(Box::new(command));
        Ok(())
    }

    /// Current target. Replaced by the restored node after every swap.
    pub fn target(&self) -> NodeHandle {
        self.target
    }

    pub fn target_id(&self) -> Option<NodeId> {
        self.target_id
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn record_hierarchy(&self) -> bool {
        self.record_hierarchy
    }

    /// Size of the held snapshot in bytes
    pub fn snapshot_len(&self) -> usize {
        self.blob.len()
    }

    pub fn topology(&self) -> &TopologyProxy {
        &self.proxy
    }

    /// Drop any previous capture and capture the target as it is now.
    ///
    /// On failure the command is left `Empty`.
    pub fn rerecord(&mut self, graph: &SceneGraph) -> Result<()> {
        self.clear();
        self.record(graph)
    }

    /// Release the snapshot and topology record.
    pub fn clear(&mut self) {
        if self.state == RecordState::Empty {
            return;
        }
        self.blob.release();
        self.proxy = TopologyProxy::default();
        self.state = RecordState::Empty;
    }

    /// Apply the edit.
    ///
    /// Right after capture the edit is already live, so this only updates
    /// the state. After a revert it restores the edited state.
    pub fn commit(&mut self, graph: &mut SceneGraph) -> Result<()> {
        match self.state {
            RecordState::Empty => Err(self.invalid("commit")),
            RecordState::Captured | RecordState::Committed => {
                self.state = RecordState::Committed;
                Ok(())
            }
            RecordState::Reverted => {
                self.swap(graph)?;
                self.state = RecordState::Committed;
                Ok(())
            }
        }
    }

    /// Restore the state captured before the edit.
    pub fn revert(&mut self, graph: &mut SceneGraph) -> Result<()> {
        match self.state {
            RecordState::Empty => Err(self.invalid("revert")),
            RecordState::Reverted => {
                log::debug!("'{}' is already reverted", self.description);
                Ok(())
            }
            RecordState::Captured | RecordState::Committed => {
                self.swap(graph)?;
                self.state = RecordState::Reverted;
                Ok(())
            }
        }
    }

    fn record(&mut self, graph: &SceneGraph) -> Result<()> {
        debug_assert_eq!(self.state, RecordState::Empty, "record over an existing capture");
        if self.state != RecordState::Empty {
            return Err(self.invalid("record"));
        }

        let target = self.locate(graph).unwrap_or(self.target);
        let blob = self.codec.encode(graph, target, self.record_hierarchy)?;
        let proxy = TopologyProxy::capture(graph, target, self.record_hierarchy)?;

        log::debug!(
            "Recorded '{}': {} node(s), {} bytes",
            self.description,
            proxy.len(),
            blob.len()
        );

        self.target = target;
        self.target_id = graph.id_of(target);
        self.blob = blob;
        self.proxy = proxy;
        self.state = RecordState::Captured;
        Ok(())
    }

    /// Replace the live target with the held snapshot, keeping the live
    /// state as the new snapshot. Nothing is mutated until the held
    /// snapshot has decoded and matched its topology record.
    fn swap(&mut self, graph: &mut SceneGraph) -> Result<()> {
        let target = self
            .locate(graph)
            .ok_or(SnapshotError::TargetDestroyed(self.target))?;

        let current_blob = self.codec.encode(graph, target, self.record_hierarchy)?;
        let current_proxy = TopologyProxy::capture(graph, target, self.record_hierarchy)?;

        let data = self.codec.decode_data(&self.blob)?;
        self.proxy.check(&data)?;

        // Without the hierarchy the live children are not part of the
        // snapshot and carry over to the restored node.
        let preserved = if self.record_hierarchy {
            Vec::new()
        } else {
            graph.children(target).to_vec()
        };
        for &child in &preserved {
            graph.detach(child)?;
        }

        graph.destroy(target)?;
        let restored = graph.instantiate(&data);
        let placement = self.proxy.reattach(graph, restored)?;

        for &child in &preserved {
            if graph.is_ancestor(restored, child) {
                log::warn!(
                    "Restored {} now sits below its former child {}; moving the child to the scene root",
                    restored,
                    child
                );
                graph.set_parent(child, None)?;
            } else {
                graph.set_parent(child, Some(restored))?;
            }
        }

        log::debug!(
            "Swapped '{}': {} -> {} ({} bytes)",
            self.description,
            target,
            restored,
            self.blob.len()
        );
        if placement.dangling.is_some() {
            log::debug!("'{}' restored under a fallback parent", self.description);
        }

        self.target = restored;
        self.target_id = graph.id_of(restored);
        self.blob = current_blob;
        self.proxy = current_proxy;
        Ok(())
    }

    /// Resolve the target, following its identity when the handle is stale.
    fn locate(&self, graph: &SceneGraph) -> Option<NodeHandle> {
        if graph.is_alive(self.target) {
            return Some(self.target);
        }
        self.target_id.and_then(|id| graph.find(id))
    }

    fn invalid(&self, operation: &'static str) -> SnapshotError {
        SnapshotError::InvalidStateTransition {
            state: self.state,
            operation,
        }
    }
}

impl EditorCommand for RecordSceneObjectCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn commit(&mut self, graph: &mut SceneGraph) -> CommandResult {
        RecordSceneObjectCommand::commit(self, graph)
    }

    fn revert(&mut self, graph: &mut SceneGraph) -> CommandResult {
        RecordSceneObjectCommand::revert(self, graph)
    }
}
