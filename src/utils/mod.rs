//! Utility modules for the notation view
//!
//! This module contains helpers shared by the API layer.

pub mod performance;

// Re-export commonly used types
pub use performance::*;
