//! Element and view enumerations
//!
//! This module defines the enums shared between the engine traits,
//! the orchestrator and the JavaScript API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pagination/layout strategy of a score
///
/// The variants are mutually exclusive. JavaScript sees them as integers.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde_repr::Serialize_repr, serde_repr::Deserialize_repr,
)]
pub enum ViewMode {
    /// Paginated layout, pages side by side
    #[default]
    Page = 0,

    /// Paginated layout without fixed page breaks
    Float = 1,

    /// One endless horizontal system
    Line = 2,

    /// One endless vertical column of systems
    System = 3,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [ViewMode::Page, ViewMode::Float, ViewMode::Line, ViewMode::System];

    /// Modes that draw every page (as opposed to only the first one)
    pub fn is_paginated(&self) -> bool {
        matches!(self, ViewMode::Page | ViewMode::Float)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Page => "page",
            ViewMode::Float => "float",
            ViewMode::Line => "line",
            ViewMode::System => "system",
        }
    }
}

impl TryFrom<u8> for ViewMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ViewMode::Page),
            1 => Ok(ViewMode::Float),
            2 => Ok(ViewMode::Line),
            3 => Ok(ViewMode::System),
            other => Err(other),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cursor direction of a nudge
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde_repr::Serialize_repr, serde_repr::Deserialize_repr)]
pub enum NudgeDirection {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
}

impl NudgeDirection {
    /// Unit offset in canvas coordinates (y grows downwards)
    pub fn unit(&self) -> (f64, f64) {
        match self {
            NudgeDirection::Left => (-1.0, 0.0),
            NudgeDirection::Right => (1.0, 0.0),
            NudgeDirection::Up => (0.0, -1.0),
            NudgeDirection::Down => (0.0, 1.0),
        }
    }
}

impl TryFrom<u8> for NudgeDirection {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NudgeDirection::Left),
            1 => Ok(NudgeDirection::Right),
            2 => Ok(NudgeDirection::Up),
            3 => Ok(NudgeDirection::Down),
            other => Err(other),
        }
    }
}

/// Kind of drawable element on a page
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    StaffLine,
    Barline,
    Clef,
    KeySignature,
    TimeSignature,
    Note,
    Rest,
    Stem,
    Beam,
    Slur,
    Lyric,
    Text,
    Other,
}

impl ElementKind {
    /// Human-readable name (used by accessibility descriptions)
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::StaffLine => "staff line",
            ElementKind::Barline => "barline",
            ElementKind::Clef => "clef",
            ElementKind::KeySignature => "key signature",
            ElementKind::TimeSignature => "time signature",
            ElementKind::Note => "note",
            ElementKind::Rest => "rest",
            ElementKind::Stem => "stem",
            ElementKind::Beam => "beam",
            ElementKind::Slur => "slur",
            ElementKind::Lyric => "lyric",
            ElementKind::Text => "text",
            ElementKind::Other => "element",
        }
    }
}

/// Stable identifier of an element within a score
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
