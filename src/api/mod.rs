//! Notation WASM API
//!
//! JavaScript-facing wrapper around [`crate::notation::Notation`].
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization and error handling
//! - `view`: The exported `NotationView` class

pub mod helpers;
pub mod view;

pub use view::NotationView;
