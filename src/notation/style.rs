//! Score style access
//!
//! Reads typed style values from the score, falling back to built-in
//! defaults, and writes changes through the undo stack.

use crate::engine::{ScoreEngine, StyleId, StyleValue};
use crate::notify::{ChangeSource, Sender};
use crate::undo::{NotationUndoStack, ScoreCommand};

/// Built-in value used when the score does not define a style
pub fn default_style_value(id: StyleId) -> StyleValue {
    match id {
        StyleId::Spatium => StyleValue::Number(24.8),
        StyleId::PageWidth => StyleValue::Number(2976.0),
        StyleId::PageHeight => StyleValue::Number(4209.0),
        StyleId::PageMargin => StyleValue::Number(170.0),
        StyleId::StaffDistance => StyleValue::Number(6.5),
        StyleId::ShowMeasureNumbers => StyleValue::Bool(true),
        StyleId::MusicalSymbolFont => StyleValue::Text("Leland".to_string()),
    }
}

/// Style sub-component
#[derive(Debug)]
pub struct NotationStyle {
    changes: Sender<ChangeSource>,
}

impl NotationStyle {
    pub fn new(changes: Sender<ChangeSource>) -> Self {
        Self { changes }
    }

    pub fn style_value(&self, score: &dyn ScoreEngine, id: StyleId) -> StyleValue {
        score.style_value(id).unwrap_or_else(|| default_style_value(id))
    }

    /// Change a style value as one undo step and relayout; returns false if unchanged
    pub fn set_style_value(
        &self,
        score: &mut dyn ScoreEngine,
        undo_stack: &mut NotationUndoStack,
        id: StyleId,
        value: StyleValue,
    ) -> bool {
        let old = self.style_value(score, id);
        if old == value {
            return false;
        }

        undo_stack.push(score, ScoreCommand::SetStyleValue { id, old, new: value });
        self.changes.send(ChangeSource::StyleChanged);
        true
    }
}
