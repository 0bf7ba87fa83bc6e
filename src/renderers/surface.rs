//! Abstract 2D drawing surface
//!
//! The notation painter and the engine's elements draw through this trait.
//! Concrete surfaces live next to it: [`super::display_list::RecordingSurface`]
//! records commands for JavaScript, [`super::svg::SvgSurface`] writes SVG.

use crate::models::{Brush, Color, Pen, PointF, RectF};

/// Drawing primitives available to painters and elements
///
/// `translate` moves the origin for every subsequent call and is cumulative;
/// callers undo it by translating by the negated offset.
pub trait Surface {
    fn translate(&mut self, offset: PointF);

    /// Stroke used by `draw_rect`, `draw_line`, `draw_ellipse`
    fn set_pen(&mut self, pen: Pen);

    /// Fill used by `draw_rect` and `draw_ellipse`
    fn set_brush(&mut self, brush: Brush);

    /// Fill without stroke, ignoring the current pen and brush
    fn fill_rect(&mut self, rect: RectF, color: Color);

    fn draw_rect(&mut self, rect: RectF);

    fn draw_line(&mut self, from: PointF, to: PointF);

    fn draw_ellipse(&mut self, rect: RectF);

    /// Text with its baseline starting at `origin`, drawn in the pen color
    fn draw_text(&mut self, origin: PointF, text: &str, size: f64);
}
