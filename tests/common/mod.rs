//! Instrumented score engine shared by the integration tests
//!
//! Pages and elements append to a shared event log whenever the painter
//! asks a page for its elements or draws an element, so tests can assert
//! what was visited and in which order.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use notation_wasm::engine::{Element, Page, ScoreEngine, StyleId, StyleValue};
use notation_wasm::{ElementId, ElementKind, Margins, PointF, RectF, Surface, ViewMode};

pub type EventLog = Rc<RefCell<Vec<Event>>>;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    PageVisited(usize),
    ElementDrawn(ElementId),
}

#[derive(Clone)]
pub struct MockElement {
    pub id: ElementId,
    pub visible: bool,
    pub pos: PointF,
    pub size: f64,
    log: EventLog,
}

impl Element for MockElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Note
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn page_pos(&self) -> PointF {
        self.pos
    }

    fn bbox(&self) -> RectF {
        RectF::new(0.0, 0.0, self.size, self.size)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.log.borrow_mut().push(Event::ElementDrawn(self.id));
        surface.draw_ellipse(self.bbox());
    }
}

#[derive(Clone)]
pub struct MockPage {
    pub index: usize,
    pub pos: PointF,
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub elements: Vec<MockElement>,
    log: EventLog,
}

impl Page for MockPage {
    fn index(&self) -> usize {
        self.index
    }

    fn pos(&self) -> PointF {
        self.pos
    }

    fn bbox(&self) -> RectF {
        RectF::new(0.0, 0.0, self.width, self.height)
    }

    fn margins(&self) -> Margins {
        self.margins
    }

    fn elements(&self) -> Vec<&dyn Element> {
        self.log.borrow_mut().push(Event::PageVisited(self.index));
        self.elements.iter().map(|e| e as &dyn Element).collect()
    }
}

/// Score whose page positions are set by the test; layout only applies `layout_shift`
#[derive(Clone)]
pub struct MockScore {
    pub title: String,
    pub tags: HashMap<String, String>,
    pub pages: Vec<MockPage>,
    pub mode: ViewMode,
    pub printing: bool,
    pub show_page_borders: bool,
    pub layouts: Rc<RefCell<usize>>,
    /// Added to every page position by each layout pass
    pub layout_shift: PointF,
    log: EventLog,
    next_id: u64,
}

impl MockScore {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            tags: HashMap::new(),
            pages: Vec::new(),
            mode: ViewMode::Page,
            printing: false,
            show_page_borders: false,
            layouts: Rc::new(RefCell::new(0)),
            layout_shift: PointF::default(),
            log: EventLog::default(),
            next_id: 1,
        }
    }

    /// Append a page of `width` x 100 at canvas position `x`
    pub fn page_at(mut self, x: f64, width: f64) -> Self {
        let index = self.pages.len();
        self.pages.push(MockPage {
            index,
            pos: PointF::new(x, 0.0),
            width,
            height: 100.0,
            margins: Margins::uniform(10.0),
            elements: Vec::new(),
            log: Rc::clone(&self.log),
        });
        self
    }

    /// Add an element to the last page
    pub fn element(mut self, pos: PointF, visible: bool) -> Self {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        let log = Rc::clone(&self.log);
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(MockElement {
                id,
                visible,
                pos,
                size: 4.0,
                log,
            });
        }
        self
    }

    pub fn borders(mut self, show: bool) -> Self {
        self.show_page_borders = show;
        self
    }

    pub fn log(&self) -> EventLog {
        Rc::clone(&self.log)
    }
}

impl ScoreEngine for MockScore {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn meta_tag(&self, key: &str) -> String {
        self.tags.get(key).cloned().unwrap_or_default()
    }

    fn set_meta_tag(&mut self, key: &str, value: &str) {
        self.tags.insert(key.to_string(), value.to_string());
    }

    fn clone_score(&self) -> Box<dyn ScoreEngine> {
        Box::new(self.clone())
    }

    fn pages(&self) -> Vec<&dyn Page> {
        self.pages.iter().map(|p| p as &dyn Page).collect()
    }

    fn layout_mode(&self) -> ViewMode {
        self.mode
    }

    fn set_layout_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    fn do_layout(&mut self) {
        *self.layouts.borrow_mut() += 1;
        for page in &mut self.pages {
            page.pos = page.pos + self.layout_shift;
        }
    }

    fn printing(&self) -> bool {
        self.printing
    }

    fn show_page_borders(&self) -> bool {
        self.show_page_borders
    }

    fn style_value(&self, _id: StyleId) -> Option<StyleValue> {
        None
    }

    fn set_style_value(&mut self, _id: StyleId, _value: StyleValue) {}

    fn move_element(&mut self, id: ElementId, delta: PointF) -> bool {
        let element = self
            .pages
            .iter_mut()
            .flat_map(|p| p.elements.iter_mut())
            .find(|e| e.id == id);
        match element {
            Some(element) => {
                element.pos = element.pos + delta;
                true
            }
            None => false,
        }
    }
}

/// Pages visited by the painter, in order
pub fn visited_pages(log: &EventLog) -> Vec<usize> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            Event::PageVisited(index) => Some(*index),
            _ => None,
        })
        .collect()
}

pub fn drawn_elements(log: &EventLog) -> Vec<ElementId> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            Event::ElementDrawn(id) => Some(*id),
            _ => None,
        })
        .collect()
}
