//! SVG document generation
//!
//! [`SvgSurface`] implements [`Surface`] by emitting SVG elements in absolute
//! coordinates; translations are folded into the coordinates as they happen.

use super::elements;
use crate::models::{Brush, Color, Pen, PointF, RectF, SizeF};
use crate::renderers::surface::Surface;

/// Surface writing an SVG document
#[derive(Debug, Default)]
pub struct SvgSurface {
    origin: PointF,
    pen: Pen,
    brush: Brush,
    body: Vec<String>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements written so far
    pub fn element_count(&self) -> usize {
        self.body.len()
    }

    /// Wrap the body in an `<svg>` root showing `viewport`
    ///
    /// The viewBox stays in engine units; the document's pixel size is the
    /// viewport divided by `pixel_ratio`.
    pub fn finish(self, viewport: RectF, pixel_ratio: f64) -> String {
        let SizeF { width, height } = viewport.size();
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        out.push('\n');
        out.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
            elements::fmt_num(width / pixel_ratio),
            elements::fmt_num(height / pixel_ratio),
            elements::fmt_num(viewport.x),
            elements::fmt_num(viewport.y),
            elements::fmt_num(width),
            elements::fmt_num(height)
        ));
        out.push('\n');
        for element in &self.body {
            out.push_str("  ");
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>");
        out
    }

    fn at(&self, point: PointF) -> PointF {
        point + self.origin
    }
}

impl Surface for SvgSurface {
    fn translate(&mut self, offset: PointF) {
        self.origin = self.origin + offset;
    }

    fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    fn fill_rect(&mut self, rect: RectF, color: Color) {
        self.body.push(elements::filled_rect(rect.translated(self.origin), color));
    }

    fn draw_rect(&mut self, rect: RectF) {
        self.body
            .push(elements::rect(rect.translated(self.origin), &self.pen, &self.brush));
    }

    fn draw_line(&mut self, from: PointF, to: PointF) {
        self.body
            .push(elements::line(self.at(from), self.at(to), &self.pen));
    }

    fn draw_ellipse(&mut self, rect: RectF) {
        self.body
            .push(elements::ellipse(rect.translated(self.origin), &self.pen, &self.brush));
    }

    fn draw_text(&mut self, origin: PointF, text: &str, size: f64) {
        self.body
            .push(elements::text(self.at(origin), text, size, self.pen.color));
    }
}
