//! Models module for the Music Notation Editor
//!
//! This module contains the value types shared by the engine traits,
//! the notation orchestrator and the renderers.

pub mod color;
pub mod elements;
pub mod geometry;
pub mod meta;

// Re-export commonly used types
pub use color::{Brush, Color, Pen};
pub use elements::{ElementId, ElementKind, NudgeDirection, ViewMode};
pub use geometry::{Margins, PointF, RectF, SizeF};
pub use meta::Meta;
