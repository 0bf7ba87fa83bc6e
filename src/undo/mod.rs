use crate::engine::{ScoreEngine, StyleId, StyleValue};
use crate::error::HistoryError;
use crate::models::{ElementId, PointF};
use crate::notify::Notification;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Represents a reversible edit applied to the score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScoreCommand {
    /// Change one metadata tag
    SetMetaTag {
        key: String,
        old: String,
        new: String,
    },
    /// Change one style value (relayouts the score)
    SetStyleValue {
        id: StyleId,
        old: StyleValue,
        new: StyleValue,
    },
    /// Offset one element on its page
    MoveElement { id: ElementId, delta: PointF },
    /// Commands grouped into one undo step
    Batch { commands: Vec<ScoreCommand> },
}

impl ScoreCommand {
    /// Execute this command on the score
    pub fn execute(&self, score: &mut dyn ScoreEngine) {
        match self {
            ScoreCommand::SetMetaTag { key, new, .. } => score.set_meta_tag(key, new),
            ScoreCommand::SetStyleValue { id, new, .. } => {
                score.set_style_value(*id, new.clone());
                score.do_layout();
            }
            ScoreCommand::MoveElement { id, delta } => {
                if !score.move_element(*id, *delta) {
                    log::warn!("Cannot move unknown element {}", id);
                }
            }
            ScoreCommand::Batch { commands } => {
                for cmd in commands {
                    cmd.execute(score);
                }
            }
        }
    }

    /// Undo this command (reverse the operation)
    pub fn undo(&self, score: &mut dyn ScoreEngine) {
        match self {
            ScoreCommand::SetMetaTag { key, old, .. } => score.set_meta_tag(key, old),
            ScoreCommand::SetStyleValue { id, old, .. } => {
                score.set_style_value(*id, old.clone());
                score.do_layout();
            }
            ScoreCommand::MoveElement { id, delta } => {
                score.move_element(*id, -*delta);
            }
            ScoreCommand::Batch { commands } => {
                // Undo batch in reverse order
                for cmd in commands.iter().rev() {
                    cmd.undo(score);
                }
            }
        }
    }

    /// True if executing the command changes nothing
    pub fn is_noop(&self) -> bool {
        match self {
            ScoreCommand::SetMetaTag { old, new, .. } => old == new,
            ScoreCommand::SetStyleValue { old, new, .. } => old == new,
            ScoreCommand::MoveElement { delta, .. } => *delta == PointF::default(),
            ScoreCommand::Batch { commands } => commands.iter().all(|c| c.is_noop()),
        }
    }
}

/// Manages undo/redo history of score edits
///
/// Edits are applied through [`NotationUndoStack::push`]. Between
/// `prepare_changes` and `commit_changes` they accumulate into one
/// transaction that undoes as a single step; outside a transaction each
/// push is its own step.
#[derive(Debug)]
pub struct NotationUndoStack {
    /// Stack of commands that can be undone
    commands: VecDeque<ScoreCommand>,
    /// Current position in the stack (for redo support)
    current_index: usize,
    /// Maximum number of commands to keep in history
    max_size: usize,
    /// Open transaction (if any)
    transaction: Option<Vec<ScoreCommand>>,
    stack_changed: Notification,
}

impl Default for NotationUndoStack {
    fn default() -> Self {
        Self::new(100)
    }
}

impl NotationUndoStack {
    /// Create a new undo stack with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            commands: VecDeque::new(),
            current_index: 0,
            max_size: max_size.max(1),
            transaction: None,
            stack_changed: Notification::new(),
        }
    }

    /// Open a transaction; nested calls join the open one
    pub fn prepare_changes(&mut self) {
        if self.transaction.is_some() {
            log::warn!("prepare_changes called with a transaction already open");
            return;
        }
        self.transaction = Some(Vec::new());
    }

    pub fn is_preparing(&self) -> bool {
        self.transaction.is_some()
    }

    /// Execute `command` on the score and record it
    pub fn push(&mut self, score: &mut dyn ScoreEngine, command: ScoreCommand) {
        command.execute(score);

        if let Some(ref mut transaction) = self.transaction {
            transaction.push(command);
        } else {
            self.record(command);
        }
    }

    /// Close the open transaction as one undo step
    pub fn commit_changes(&mut self) {
        let Some(batch) = self.transaction.take() else {
            log::warn!("commit_changes called without prepare_changes");
            return;
        };

        let mut batch = batch.into_iter().filter(|c| !c.is_noop()).collect::<Vec<_>>();
        let command = match batch.len() {
            0 => return,
            1 => batch.remove(0),
            _ => ScoreCommand::Batch { commands: batch },
        };
        self.record(command);
    }

    /// Revert everything pushed since `prepare_changes`
    pub fn rollback_changes(&mut self, score: &mut dyn ScoreEngine) {
        if let Some(batch) = self.transaction.take() {
            for cmd in batch.iter().rev() {
                cmd.undo(score);
            }
        }
    }

    fn record(&mut self, command: ScoreCommand) {
        if command.is_noop() {
            return;
        }

        // Truncate any redo history when new command is added
        self.commands.truncate(self.current_index);
        self.commands.push_back(command);
        self.current_index = self.commands.len();

        // Enforce max size
        if self.commands.len() > self.max_size {
            self.commands.pop_front();
            self.current_index = self.current_index.saturating_sub(1);
        }

        self.stack_changed.notify();
    }

    pub fn can_undo(&self) -> bool {
        self.transaction.is_none() && self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.transaction.is_none() && self.current_index < self.commands.len()
    }

    pub fn undo(&mut self, score: &mut dyn ScoreEngine) -> Result<(), HistoryError> {
        if self.transaction.is_some() {
            return Err(HistoryError::TransactionOpen);
        }
        if self.current_index == 0 {
            return Err(HistoryError::NothingToUndo);
        }

        self.current_index -= 1;
        self.commands[self.current_index].undo(score);
        self.stack_changed.notify();
        Ok(())
    }

    pub fn redo(&mut self, score: &mut dyn ScoreEngine) -> Result<(), HistoryError> {
        if self.transaction.is_some() {
            return Err(HistoryError::TransactionOpen);
        }
        if self.current_index >= self.commands.len() {
            return Err(HistoryError::NothingToRedo);
        }

        self.commands[self.current_index].execute(score);
        self.current_index += 1;
        self.stack_changed.notify();
        Ok(())
    }

    /// Drop all history (a different score was attached)
    pub fn clear(&mut self) {
        let had_history = !self.commands.is_empty();
        self.commands.clear();
        self.current_index = 0;
        self.transaction = None;
        if had_history {
            self.stack_changed.notify();
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn stack_changed(&self) -> &Notification {
        &self.stack_changed
    }
}
