//! Notation WASM Module
//!
//! Score view orchestration for the notation editor: attaches a score
//! engine, exposes its metadata, switches layout modes and paints the
//! visible pages with their borders and the interaction overlay.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod notation;
pub mod notify;
pub mod renderers;
pub mod undo;
pub mod utils;

// Re-export commonly used types
pub use config::{NotationConfiguration, NudgeStep, DEFAULT_CONFIGURATION};
pub use engine::{Element, MemoryScore, Page, ScoreEngine};
pub use error::{NotationError, Result};
pub use models::*;
pub use notation::{Notation, PaintStats};
pub use notify::{Channel, Notification, ValCh};
pub use renderers::{DisplayList, DrawCommand, RecordingSurface, SVGRenderer, Surface, SvgSurface};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("logger already initialized: {}", e).into());
    }

    log::info!("Notation WASM module initialized");
}
