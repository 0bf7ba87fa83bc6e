//! Error types for the notation layer
//!
//! Most operations on a notation without a score are silent no-ops and never
//! produce an error. The variants here cover the edges that can actually fail:
//! configuration input, MIDI bytes, undo history and score descriptions.

use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum NotationError {
    /// Configuration JSON could not be parsed
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration parsed but holds an unusable value
    #[error("invalid configuration value for '{field}': {reason}")]
    ConfigValue { field: &'static str, reason: String },

    /// Bytes are not a valid live MIDI message
    #[error("invalid MIDI message: {0}")]
    Midi(String),

    /// Undo/redo requested with nothing to apply
    #[error("{0}")]
    History(#[from] HistoryError),

    /// Score description for the in-memory engine is inconsistent
    #[error("invalid score description: {0}")]
    ScoreDescription(String),
}

/// Undo stack failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("no score attached")]
    NoScore,

    /// A transaction is open; it must be committed or rolled back first
    #[error("changes are being prepared; commit or roll back first")]
    TransactionOpen,
}

pub type Result<T> = std::result::Result<T, NotationError>;
