//! Void Undo - Scene Object Snapshots and Undo/Redo
//!
//! Undo support for scene edits that have no dedicated inverse. Before an
//! edit the target node (optionally with its whole subtree) is captured into
//! a compact binary snapshot together with a record of where it sat in the
//! hierarchy. Undo swaps the live node for the snapshot; redo swaps back.
//!
//! # Features
//!
//! - Versioned, length-checked binary snapshots (bincode payload)
//! - Restored nodes keep their identity tokens and sibling position
//! - Dangling-parent recovery to the nearest surviving ancestor
//! - Bounded history with transactions
//!
//! # Example
//!
//! ```ignore
//! use void_scene::prelude::*;
//! use void_undo::prelude::*;
//!
//! let mut graph = SceneGraph::new();
//! let mut history = UndoRedo::startup(UndoConfig::default());
//!
//! let lamp = graph.spawn("Lamp");
//! commands::execute(&mut history, &graph, lamp, false, "Move Lamp")?;
//! graph.get_mut(lamp).unwrap().transform = Transform::from_translation([0.0, 2.0, 0.0]);
//!
//! history.undo(&mut graph)?;
//! history.redo(&mut graph)?;
//! history.shutdown();
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod snapshot;

pub mod prelude {
    pub use crate::commands::{self, CommandResult, EditorCommand, RecordSceneObjectCommand, RecordState};
    pub use crate::config::{ConfigError, UndoConfig};
    pub use crate::error::SnapshotError;
    pub use crate::history::{Transaction, UndoRedo};
    pub use crate::snapshot::{Reattachment, SceneSnapshotCodec, SnapshotBlob, TopologyProxy};
}

pub use prelude::*;
