//! SVG rendering output
//!
//! This module renders a notation's visible region as a standalone SVG
//! document.

pub mod document;
pub mod elements;

pub use document::SvgSurface;

use crate::models::RectF;
use crate::notation::Notation;

/// SVG document generator
pub struct SVGRenderer;

impl SVGRenderer {
    /// Paint `region` of the notation into an SVG document
    ///
    /// The document's pixel size is the region scaled by the configured
    /// pixel ratio.
    pub fn render(notation: &mut Notation, region: RectF) -> String {
        let mut surface = SvgSurface::new();
        let stats = notation.paint(&mut surface, region);
        log::debug!(
            "SVG export: {} page(s), {} element(s), {} svg node(s)",
            stats.pages_painted,
            stats.elements_painted,
            surface.element_count()
        );
        surface.finish(region, notation.configuration().pixel_ratio)
    }
}
