//! Undo/Redo history with transaction support.
//!
//! Commands are registered after their edit has happened. Undo reverts the
//! newest command and moves it to the redo stack; redo commits it again.
//! Commands can be grouped into transactions that undo as one unit.
//!
//! There is no global instance: the editor creates one with
//! [`UndoRedo::startup`] and passes it around explicitly until
//! [`UndoRedo::shutdown`].

use void_scene::SceneGraph;

use crate::commands::{CommandResult, EditorCommand};
use crate::config::UndoConfig;
use crate::error::Result;
use crate::snapshot::SceneSnapshotCodec;

/// A group of commands committed as a single undoable unit.
pub struct Transaction {
    pub name: String,
    pub commands: Vec<Box<dyn EditorCommand>>,
}

impl Transaction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: Box<dyn EditorCommand>) {
        self.commands.push(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Undo/redo history stack.
pub struct UndoRedo {
    /// Commands that can be undone
    undo_stack: Vec<Box<dyn EditorCommand>>,
    /// Commands that can be redone
    redo_stack: Vec<Box<dyn EditorCommand>>,
    config: UndoConfig,
    /// Codec shared by snapshot commands registered here
    codec: SceneSnapshotCodec,
    /// Current open transaction
    current_transaction: Option<Transaction>,
    /// Whether history has been modified since last save
    dirty: bool,
}

impl Default for UndoRedo {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoRedo {
    pub fn new() -> Self {
        Self::with_config(UndoConfig::default())
    }

    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            codec: SceneSnapshotCodec::from_config(&config),
            config,
            current_transaction: None,
            dirty: false,
        }
    }

    /// Create the editor's history.
    pub fn startup(config: UndoConfig) -> Self {
        log::info!(
            "Undo/redo started (max history: {}, record hierarchy: {})",
            config.max_history,
            config.record_hierarchy
        );
        Self::with_config(config)
    }

    /// Tear the history down, releasing every held command.
    pub fn shutdown(mut self) {
        let released = self.len();
        self.clear();
        log::info!("Undo/redo shut down, released {} command(s)", released);
    }

    pub fn config(&self) -> &UndoConfig {
        &self.config
    }

    pub fn codec(&self) -> &SceneSnapshotCodec {
        &self.codec
    }

    /// Check if there are commands to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there are commands to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the next undo command.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Get the description of the next redo command.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as saved (clears dirty flag).
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Begin a new transaction.
    /// Commands registered during a transaction are grouped as one undo unit.
    pub fn begin_transaction(&mut self, name: impl Into<String>) {
        if self.current_transaction.is_some() {
            log::warn!("Beginning transaction while one is already open");
        }
        self.current_transaction = Some(Transaction::new(name));
    }

    /// Commit the current transaction.
    pub fn commit_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            if !transaction.is_empty() {
                self.push_command(Box::new(TransactionCommand(transaction)));
            }
        }
    }

    /// Roll back the current transaction, reverting what it holds.
    ///
    /// If a member fails to revert, the members already reverted are
    /// committed again and the transaction stays open, unchanged.
    pub fn rollback_transaction(&mut self, graph: &mut SceneGraph) -> Result<()> {
        let Some(transaction) = self.current_transaction.take() else {
            return Ok(());
        };
        log::debug!(
            "Rolling back transaction '{}' ({} command(s))",
            transaction.name,
            transaction.commands.len()
        );

        let mut group = TransactionCommand(transaction);
        if let Err(e) = group.revert(graph) {
            log::warn!("Rollback of '{}' failed: {}", group.0.name, e);
            self.current_transaction = Some(group.0);
            return Err(e);
        }
        Ok(())
    }

    /// Check if a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.current_transaction.is_some()
    }

    /// Register a command whose edit has already been made.
    pub fn register(&mut self, cmd: Box<dyn EditorCommand>) {
        if let Some(ref mut transaction) = self.current_transaction {
            transaction.push(cmd);
        } else {
            self.push_command(cmd);
        }
    }

    fn push_command(&mut self, cmd: Box<dyn EditorCommand>) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear(); // New action discards the redo branch
        self.dirty = true;

        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            for evicted in self.undo_stack.drain(..excess) {
                log::debug!("Evicting '{}' from undo history", evicted.description());
            }
        }
    }

    /// Revert the newest command.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. A command that
    /// fails to revert stays on the undo stack.
    pub fn undo(&mut self, graph: &mut SceneGraph) -> Result<bool> {
        if self.in_transaction() {
            log::warn!("Cannot undo while a transaction is open");
            return Ok(false);
        }
        let Some(mut cmd) = self.undo_stack.pop() else {
            return Ok(false);
        };

        match cmd.revert(graph) {
            Ok(()) => {
                log::debug!("Undo: {}", cmd.description());
                self.redo_stack.push(cmd);
                self.dirty = true;
                Ok(true)
            }
            Err(e) => {
                // Put command back on undo stack
                log::warn!("Undo of '{}' failed: {}", cmd.description(), e);
                self.undo_stack.push(cmd);
                Err(e)
            }
        }
    }

    /// Commit the newest undone command again.
    ///
    /// Returns `Ok(false)` when there is nothing to redo. A command that
    /// fails to commit stays on the redo stack.
    pub fn redo(&mut self, graph: &mut SceneGraph) -> Result<bool> {
        if self.in_transaction() {
            log::warn!("Cannot redo while a transaction is open");
            return Ok(false);
        }
        let Some(mut cmd) = self.redo_stack.pop() else {
            return Ok(false);
        };

        match cmd.commit(graph) {
            Ok(()) => {
                log::debug!("Redo: {}", cmd.description());
                self.undo_stack.push(cmd);
                self.dirty = true;
                Ok(true)
            }
            Err(e) => {
                // Put command back on redo stack
                log::warn!("Redo of '{}' failed: {}", cmd.description(), e);
                self.redo_stack.push(cmd);
                Err(e)
            }
        }
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_transaction = None;
        self.dirty = false;
    }

    /// Get the number of commands in the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of commands in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Total number of held commands, including an open transaction's.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
            + self.redo_stack.len()
            + self.current_transaction.as_ref().map_or(0, |t| t.commands.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A command that wraps a transaction.
struct TransactionCommand(Transaction);

impl EditorCommand for TransactionCommand {
    fn description(&self) -> &str {
        &self.0.name
    }

    fn commit(&mut self, graph: &mut SceneGraph) -> CommandResult {
        let commands = &mut self.0.commands;
        for i in 0..commands.len() {
            if let Err(e) = commands[i].commit(graph) {
                // Take the group back to where it started
                for done in commands[..i].iter_mut().rev() {
                    if let Err(undo_err) = done.revert(graph) {
                        log::error!("Failed to unwind '{}': {}", done.description(), undo_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn revert(&mut self, graph: &mut SceneGraph) -> CommandResult {
        // Undo in reverse order
        let commands = &mut self.0.commands;
        for i in (0..commands.len()).rev() {
            if let Err(e) = commands[i].revert(graph) {
                for done in commands[i + 1..].iter_mut() {
                    if let Err(redo_err) = done.commit(graph) {
                        log::error!("Failed to unwind '{}': {}", done.description(), redo_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}
