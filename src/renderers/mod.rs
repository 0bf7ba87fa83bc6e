//! Rendering backends
//!
//! Painting goes through the [`surface::Surface`] trait. The recording
//! surface captures a serializable display list for the web front end;
//! the SVG surface produces a standalone document for export and previews.

pub mod display_list;
pub mod surface;
pub mod svg;

pub use display_list::{DisplayList, DrawCommand, RecordingSurface};
pub use surface::Surface;
pub use svg::{SVGRenderer, SvgSurface};
