//! Score/layout engine interface
//!
//! The notation layer does not own musical data or layout. It talks to an
//! engine through these traits: a score hands out pages in layout order,
//! pages hand out elements in paint order, and elements draw themselves.

pub mod memory;

use crate::models::{ElementId, ElementKind, Margins, PointF, RectF, ViewMode};
use crate::renderers::surface::Surface;

pub use memory::{MemoryElement, MemoryPage, MemoryScore, Shape};

/// Typed style identifiers understood by the notation layer
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum StyleId {
    Spatium,
    PageWidth,
    PageHeight,
    PageMargin,
    StaffDistance,
    ShowMeasureNumbers,
    MusicalSymbolFont,
}

/// Style value
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StyleValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// A loaded score
pub trait ScoreEngine {
    fn title(&self) -> String;

    /// Metadata tag value, empty when unset
    fn meta_tag(&self, key: &str) -> String;

    fn set_meta_tag(&mut self, key: &str, value: &str);

    /// Deep copy with an independent lifecycle
    fn clone_score(&self) -> Box<dyn ScoreEngine>;

    /// Pages in layout order
    fn pages(&self) -> Vec<&dyn Page>;

    fn layout_mode(&self) -> ViewMode;

    fn set_layout_mode(&mut self, mode: ViewMode);

    /// Synchronous full relayout
    fn do_layout(&mut self);

    /// True while the score is being rendered for print/export
    fn printing(&self) -> bool;

    fn show_page_borders(&self) -> bool;

    fn style_value(&self, id: StyleId) -> Option<StyleValue>;

    fn set_style_value(&mut self, id: StyleId, value: StyleValue);

    /// Offset an element's position on its page; false if the id is unknown
    fn move_element(&mut self, id: ElementId, delta: PointF) -> bool;
}

/// One paginated rendering unit
pub trait Page {
    /// Page index in the score (0-based)
    fn index(&self) -> usize;

    /// Position of the page on the canvas
    fn pos(&self) -> PointF;

    /// Bounding box in page coordinates
    fn bbox(&self) -> RectF;

    /// Bounding box in canvas coordinates
    fn canvas_bounding_rect(&self) -> RectF {
        self.bbox().translated(self.pos())
    }

    fn margins(&self) -> Margins;

    /// Odd pages are recto; page numbers start at 1, so index 0 is odd
    fn is_odd(&self) -> bool {
        self.index() % 2 == 0
    }

    /// Elements in paint order
    fn elements(&self) -> Vec<&dyn Element>;
}

/// A drawable element on a page
pub trait Element {
    fn id(&self) -> ElementId;

    fn kind(&self) -> ElementKind;

    fn visible(&self) -> bool;

    /// Position relative to its page
    fn page_pos(&self) -> PointF;

    /// Bounding box relative to `page_pos`
    fn bbox(&self) -> RectF;

    /// Draw with the origin at `page_pos`
    fn draw(&self, surface: &mut dyn Surface);
}
