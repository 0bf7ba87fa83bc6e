//! In-memory score engine
//!
//! A small engine holding already-engraved pages of primitive shapes. It is
//! what the JavaScript API and the tests drive the notation layer with.
//! Its `do_layout` only positions whole pages on the canvas according to the
//! layout mode; there is no line or page breaking.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{Element, Page, ScoreEngine, StyleId, StyleValue};
use crate::error::{NotationError, Result};
use crate::models::{Brush, Color, ElementId, ElementKind, Margins, Pen, PointF, RectF, SizeF, ViewMode};
use crate::renderers::surface::Surface;

/// Horizontal gap between pages in page/float mode
pub const PAGE_GAP: f64 = 50.0;

/// Average glyph advance relative to font size, for text bounding boxes
const TEXT_ADVANCE: f64 = 0.6;

/// Primitive geometry of a [`MemoryElement`], relative to the element position
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Rect {
        width: f64,
        height: f64,
        #[serde(default)]
        filled: bool,
    },
    Line {
        dx: f64,
        dy: f64,
        #[serde(default = "default_stroke")]
        stroke: f64,
    },
    Ellipse {
        width: f64,
        height: f64,
        #[serde(default = "default_filled")]
        filled: bool,
    },
    /// Baseline starts at the element position
    Text { text: String, size: f64 },
}

fn default_stroke() -> f64 {
    1.0
}

fn default_filled() -> bool {
    true
}

fn default_visible() -> bool {
    true
}

fn default_color() -> Color {
    Color::BLACK
}

/// Element of the in-memory engine
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MemoryElement {
    pub id: ElementId,
    pub kind: ElementKind,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub pos: PointF,
    #[serde(default = "default_color")]
    pub color: Color,
    pub shape: Shape,
}

impl Element for MemoryElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn page_pos(&self) -> PointF {
        self.pos
    }

    fn bbox(&self) -> RectF {
        match &self.shape {
            Shape::Rect { width, height, .. } | Shape::Ellipse { width, height, .. } => {
                RectF::new(0.0, 0.0, *width, *height)
            }
            Shape::Line { dx, dy, stroke } => {
                RectF::from_corners(PointF::default(), PointF::new(*dx, *dy)).adjusted(
                    -stroke / 2.0,
                    -stroke / 2.0,
                    stroke / 2.0,
                    stroke / 2.0,
                )
            }
            Shape::Text { text, size } => {
                let width = text.chars().count() as f64 * size * TEXT_ADVANCE;
                RectF::new(0.0, -size, width, *size)
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        match &self.shape {
            Shape::Rect { width, height, filled } => {
                surface.set_pen(Pen::new(self.color, 1.0));
                surface.set_brush(if *filled { Brush::Solid(self.color) } else { Brush::None });
                surface.draw_rect(RectF::new(0.0, 0.0, *width, *height));
            }
            Shape::Line { dx, dy, stroke } => {
                surface.set_pen(Pen::new(self.color, *stroke));
                surface.draw_line(PointF::default(), PointF::new(*dx, *dy));
            }
            Shape::Ellipse { width, height, filled } => {
                surface.set_pen(Pen::new(self.color, 1.0));
                surface.set_brush(if *filled { Brush::Solid(self.color) } else { Brush::None });
                surface.draw_ellipse(RectF::new(0.0, 0.0, *width, *height));
            }
            Shape::Text { text, size } => {
                surface.set_pen(Pen::new(self.color, 1.0));
                surface.draw_text(PointF::default(), text, *size);
            }
        }
    }
}

/// Page of the in-memory engine
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MemoryPage {
    /// Assigned by layout
    #[serde(skip)]
    pub index: usize,
    /// Assigned by layout
    #[serde(skip)]
    pub pos: PointF,
    pub size: SizeF,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub elements: Vec<MemoryElement>,
}

impl MemoryPage {
    pub fn new(size: SizeF, margins: Margins) -> Self {
        Self {
            index: 0,
            pos: PointF::default(),
            size,
            margins,
            elements: Vec::new(),
        }
    }
}

impl Page for MemoryPage {
    fn index(&self) -> usize {
        self.index
    }

    fn pos(&self) -> PointF {
        self.pos
    }

    fn bbox(&self) -> RectF {
        RectF::from_size(self.size)
    }

    fn margins(&self) -> Margins {
        self.margins
    }

    fn elements(&self) -> Vec<&dyn Element> {
        self.elements.iter().map(|e| e as &dyn Element).collect()
    }
}

/// Score of the in-memory engine
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemoryScore {
    pub title: String,
    #[serde(default)]
    pub meta_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub pages: Vec<MemoryPage>,
    #[serde(default)]
    pub layout_mode: ViewMode,
    #[serde(default)]
    pub printing: bool,
    #[serde(default)]
    pub show_page_borders: bool,
    #[serde(default)]
    pub style: BTreeMap<StyleId, StyleValue>,
    /// Number of layout passes run so far
    #[serde(skip)]
    pub layout_count: usize,
}

impl MemoryScore {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON score description, validate it and lay it out
    pub fn from_json(json: &str) -> Result<Self> {
        let mut score: MemoryScore = serde_json::from_str(json)
            .map_err(|e| NotationError::ScoreDescription(e.to_string()))?;
        score.validate()?;
        score.do_layout();
        Ok(score)
    }

    /// Element ids must be unique across the whole score and page sizes positive
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (page_index, page) in self.pages.iter().enumerate() {
            if page.size.is_empty() {
                return Err(NotationError::ScoreDescription(format!(
                    "page {} has an empty size",
                    page_index
                )));
            }
            for element in &page.elements {
                if !seen.insert(element.id) {
                    return Err(NotationError::ScoreDescription(format!(
                        "duplicate element id {} on page {}",
                        element.id, page_index
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn add_page(&mut self, size: SizeF, margins: Margins) -> usize {
        self.pages.push(MemoryPage::new(size, margins));
        self.do_layout();
        self.pages.len() - 1
    }

    /// Append an element to a page with a fresh id; `None` if the page does not exist
    pub fn add_element(
        &mut self,
        page: usize,
        kind: ElementKind,
        pos: PointF,
        shape: Shape,
    ) -> Option<ElementId> {
        let id = self.next_element_id();
        let page = self.pages.get_mut(page)?;
        page.elements.push(MemoryElement {
            id,
            kind,
            visible: true,
            pos,
            color: Color::BLACK,
            shape,
        });
        Some(id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut MemoryElement> {
        self.pages
            .iter_mut()
            .flat_map(|p| p.elements.iter_mut())
            .find(|e| e.id == id)
    }

    fn next_element_id(&self) -> ElementId {
        let max = self
            .pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .map(|e| e.id.0)
            .max();
        ElementId(max.map_or(1, |m| m + 1))
    }
}

impl ScoreEngine for MemoryScore {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn meta_tag(&self, key: &str) -> String {
        self.meta_tags.get(key).cloned().unwrap_or_default()
    }

    fn set_meta_tag(&mut self, key: &str, value: &str) {
        self.meta_tags.insert(key.to_string(), value.to_string());
    }

    fn clone_score(&self) -> Box<dyn ScoreEngine> {
        Box::new(self.clone())
    }

    fn pages(&self) -> Vec<&dyn Page> {
        self.pages.iter().map(|p| p as &dyn Page).collect()
    }

    fn layout_mode(&self) -> ViewMode {
        self.layout_mode
    }

    fn set_layout_mode(&mut self, mode: ViewMode) {
        self.layout_mode = mode;
    }

    fn do_layout(&mut self) {
        let mut cursor = PointF::default();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.index = index;
            page.pos = cursor;
            match self.layout_mode {
                ViewMode::Page | ViewMode::Float => cursor.x += page.size.width + PAGE_GAP,
                ViewMode::Line => cursor.x += page.size.width,
                ViewMode::System => cursor.y += page.size.height,
            }
        }
        self.layout_count += 1;
        log::debug!(
            "Laid out {} page(s) in {} mode (pass {})",
            self.pages.len(),
            self.layout_mode,
            self.layout_count
        );
    }

    fn printing(&self) -> bool {
        self.printing
    }

    fn show_page_borders(&self) -> bool {
        self.show_page_borders
    }

    fn style_value(&self, id: StyleId) -> Option<StyleValue> {
        self.style.get(&id).cloned()
    }

    fn set_style_value(&mut self, id: StyleId, value: StyleValue) {
        self.style.insert(id, value);
    }

    fn move_element(&mut self, id: ElementId, delta: PointF) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.pos = element.pos + delta;
                true
            }
            None => false,
        }
    }
}
