//! Command pattern implementation for undo/redo support.
//!
//! Every undoable scene edit is paired with a command registered in the
//! [`UndoRedo`] history.

mod command;
mod record_scene_object;

pub use command::{CommandResult, EditorCommand};
pub use record_scene_object::{RecordSceneObjectCommand, RecordState};

use void_scene::{NodeHandle, SceneGraph};

use crate::error::Result;
use crate::history::UndoRedo;

/// Snapshot `node` right before an edit and register the command.
///
/// An empty `description` falls back to
/// [`RecordSceneObjectCommand::DEFAULT_DESCRIPTION`].
pub fn execute(
    history: &mut UndoRedo,
    graph: &SceneGraph,
    node: NodeHandle,
    record_hierarchy: bool,
    description: &str,
) -> Result<()> {
    RecordSceneObjectCommand::execute(history, graph, node, record_hierarchy, description)
}

/// Same as [`execute`], taking the hierarchy flag from the history's
/// configuration.
pub fn record(history: &mut UndoRedo, graph: &SceneGraph, node: NodeHandle, description: &str) -> Result<()> {
    let record_hierarchy = history.config().record_hierarchy;
    execute(history, graph, node, record_hierarchy, description)
}

/// Apply a command and add it to history.
pub fn apply(history: &mut UndoRedo, graph: &mut SceneGraph, mut cmd: Box<dyn EditorCommand>) -> CommandResult {
    cmd.commit(graph)?;
    history.register(cmd);
    Ok(())
}
