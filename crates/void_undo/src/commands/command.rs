//! Command trait and result types.

use void_scene::SceneGraph;

use crate::error::SnapshotError;

/// Result type for command commit/revert.
pub type CommandResult = Result<(), SnapshotError>;

/// An edit that can be reverted and re-applied.
///
/// The edit itself is made by the caller. A command only has to be able to
/// move the graph back to the state before the edit (`revert`) and forward
/// again to the state after it (`commit`), any number of times.
///
/// # Example
///
/// ```ignore
/// struct RenameCommand {
///     node: NodeHandle,
///     before: String,
///     after: String,
/// }
///
/// impl EditorCommand for RenameCommand {
///     fn description(&self) -> &str { "Rename" }
///
///     fn commit(&mut self, graph: &mut SceneGraph) -> CommandResult {
///         if let Some(node) = graph.get_mut(self.node) {
///             node.name = self.after.clone();
///         }
///         Ok(())
///     }
///
///     fn revert(&mut self, graph: &mut SceneGraph) -> CommandResult {
///         if let Some(node) = graph.get_mut(self.node) {
///             node.name = self.before.clone();
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait EditorCommand: Send + Sync {
    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    /// Apply (or re-apply) the edit.
    fn commit(&mut self, graph: &mut SceneGraph) -> CommandResult;

    /// Restore the state from before the edit.
    fn revert(&mut self, graph: &mut SceneGraph) -> CommandResult;
}
