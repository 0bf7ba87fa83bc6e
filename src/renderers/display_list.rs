//! Display List for Notation Rendering
//!
//! This module defines the output structure handed to JavaScript after a paint.
//! The DisplayList contains every drawing command in paint order, so the canvas
//! side can replay it without knowing anything about pages or elements.

use serde::{Deserialize, Serialize};

use super::surface::Surface;
use crate::models::{Brush, Color, Pen, PointF, RectF};

/// A single recorded drawing command
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Translate { dx: f64, dy: f64 },
    SetPen { pen: Pen },
    SetBrush { brush: Brush },
    FillRect { rect: RectF, color: Color },
    DrawRect { rect: RectF },
    DrawLine { from: PointF, to: PointF },
    DrawEllipse { rect: RectF },
    DrawText { origin: PointF, text: String, size: f64 },
}

impl DrawCommand {
    /// Whether the command puts pixels on the surface (as opposed to state changes)
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            DrawCommand::FillRect { .. }
                | DrawCommand::DrawRect { .. }
                | DrawCommand::DrawLine { .. }
                | DrawCommand::DrawEllipse { .. }
                | DrawCommand::DrawText { .. }
        )
    }
}

/// Top-level display list containing all rendering information
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    /// Commands in paint order
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Number of commands that draw something
    pub fn drawing_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_drawing()).count()
    }

    pub fn count_lines(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawLine { .. }))
            .count()
    }

    pub fn count_rects(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawRect { .. }))
            .count()
    }

    /// All `fill_rect` commands with their fill color
    pub fn fills(&self) -> Vec<(RectF, Color)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    /// Sum of all translations; zero when every translate was undone
    pub fn net_translation(&self) -> PointF {
        self.commands
            .iter()
            .fold(PointF::default(), |acc, c| match c {
                DrawCommand::Translate { dx, dy } => PointF::new(acc.x + dx, acc.y + dy),
                _ => acc,
            })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Surface that records every call into a [`DisplayList`]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    list: DisplayList,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    pub fn into_display_list(self) -> DisplayList {
        self.list
    }

    fn push(&mut self, command: DrawCommand) {
        self.list.commands.push(command);
    }
}

impl Surface for RecordingSurface {
    fn translate(&mut self, offset: PointF) {
        self.push(DrawCommand::Translate {
            dx: offset.x,
            dy: offset.y,
        });
    }

    fn set_pen(&mut self, pen: Pen) {
        self.push(DrawCommand::SetPen { pen });
    }

    fn set_brush(&mut self, brush: Brush) {
        self.push(DrawCommand::SetBrush { brush });
    }

    fn fill_rect(&mut self, rect: RectF, color: Color) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_rect(&mut self, rect: RectF) {
        self.push(DrawCommand::DrawRect { rect });
    }

    fn draw_line(&mut self, from: PointF, to: PointF) {
        self.push(DrawCommand::DrawLine { from, to });
    }

    fn draw_ellipse(&mut self, rect: RectF) {
        self.push(DrawCommand::DrawEllipse { rect });
    }

    fn draw_text(&mut self, origin: PointF, text: &str, size: f64) {
        self.push(DrawCommand::DrawText {
            origin,
            text: text.to_string(),
            size,
        });
    }
}
