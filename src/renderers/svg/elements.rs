//! SVG element markup
//!
//! Free functions producing single SVG elements in absolute coordinates.

use crate::models::{Brush, Color, Pen, PointF, RectF};

/// Escape text content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn fmt_num(v: f64) -> String {
    // Trim trailing zeros so output stays compact and stable
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn paint_attr(name: &str, color: Color) -> String {
    if color.a == 255 {
        format!(r#" {}="{}""#, name, color.to_hex())
    } else {
        format!(
            r#" {}="{}" {}-opacity="{}""#,
            name,
            Color::rgb(color.r, color.g, color.b).to_hex(),
            name,
            fmt_num(color.a as f64 / 255.0)
        )
    }
}

fn stroke_attrs(pen: &Pen) -> String {
    let width = if pen.width <= 0.0 { 1.0 } else { pen.width };
    let mut attrs = paint_attr("stroke", pen.color);
    attrs.push_str(&format!(r#" stroke-width="{}""#, fmt_num(width)));
    if pen.width <= 0.0 {
        attrs.push_str(r#" vector-effect="non-scaling-stroke""#);
    }
    attrs
}

fn fill_attrs(brush: &Brush) -> String {
    match brush {
        Brush::None => r#" fill="none""#.to_string(),
        Brush::Solid(color) => paint_attr("fill", *color),
    }
}

pub fn filled_rect(rect: RectF, color: Color) -> String {
    format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
        fmt_num(rect.x),
        fmt_num(rect.y),
        fmt_num(rect.width),
        fmt_num(rect.height),
        paint_attr("fill", color)
    )
}

pub fn rect(rect: RectF, pen: &Pen, brush: &Brush) -> String {
    format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
        fmt_num(rect.x),
        fmt_num(rect.y),
        fmt_num(rect.width),
        fmt_num(rect.height),
        fill_attrs(brush),
        stroke_attrs(pen)
    )
}

pub fn line(from: PointF, to: PointF, pen: &Pen) -> String {
    format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
        fmt_num(from.x),
        fmt_num(from.y),
        fmt_num(to.x),
        fmt_num(to.y),
        stroke_attrs(pen)
    )
}

pub fn ellipse(rect: RectF, pen: &Pen, brush: &Brush) -> String {
    format!(
        r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}"{}{}/>"#,
        fmt_num(rect.x + rect.width / 2.0),
        fmt_num(rect.y + rect.height / 2.0),
        fmt_num(rect.width / 2.0),
        fmt_num(rect.height / 2.0),
        fill_attrs(brush),
        stroke_attrs(pen)
    )
}

pub fn text(origin: PointF, content: &str, size: f64, color: Color) -> String {
    format!(
        r#"<text x="{}" y="{}" font-size="{}"{}>{}</text>"#,
        fmt_num(origin.x),
        fmt_num(origin.y),
        fmt_num(size),
        paint_attr("fill", color),
        escape(content)
    )
}
