//! Element queries over the attached score

use serde::{Deserialize, Serialize};

use crate::engine::ScoreEngine;
use crate::models::{ElementId, ElementKind, RectF};

/// Flat description of an element for lists and inspectors
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ElementInfo {
    pub id: ElementId,
    pub kind: ElementKind,
    pub page: usize,
    pub visible: bool,
    pub canvas_rect: RectF,
}

/// Element query sub-component
#[derive(Debug, Default)]
pub struct NotationElements;

impl NotationElements {
    pub fn new() -> Self {
        Self
    }

    /// Every element of the score in page then paint order
    pub fn all(&self, score: &dyn ScoreEngine) -> Vec<ElementInfo> {
        self.filter(score, |_| true)
    }

    pub fn find(&self, score: &dyn ScoreEngine, id: ElementId) -> Option<ElementInfo> {
        self.filter(score, |info| info.id == id).into_iter().next()
    }

    pub fn by_kind(&self, score: &dyn ScoreEngine, kind: ElementKind) -> Vec<ElementInfo> {
        self.filter(score, |info| info.kind == kind)
    }

    pub fn on_page(&self, score: &dyn ScoreEngine, page: usize) -> Vec<ElementInfo> {
        self.filter(score, |info| info.page == page)
    }

    fn filter(&self, score: &dyn ScoreEngine, keep: impl Fn(&ElementInfo) -> bool) -> Vec<ElementInfo> {
        let mut out = Vec::new();
        for page in score.pages() {
            let origin = page.pos();
            for element in page.elements() {
                let info = ElementInfo {
                    id: element.id(),
                    kind: element.kind(),
                    page: page.index(),
                    visible: element.visible(),
                    canvas_rect: element.bbox().translated(origin + element.page_pos()),
                };
                if keep(&info) {
                    out.push(info);
                }
            }
        }
        out
    }
}
