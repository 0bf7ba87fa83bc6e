//! Notation interaction: selection, hit-testing, drag/drop, text editing, note input
//!
//! Interaction never holds the score. Operations that look at the score take
//! it as an argument, and changes are reported through send-only channels.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::midi_input::InputNote;
use super::paint::shown_pages;
use crate::config::NotationConfiguration;
use crate::engine::ScoreEngine;
use crate::models::{Brush, Color, ElementId, ElementKind, Pen, PointF, RectF};
use crate::notify::{ChangeSource, Channel, Sender};
use crate::renderers::surface::Surface;

/// Size of the marker drawn at a pending drop position
const DROP_MARKER_SIZE: f64 = 8.0;

/// An element found by hit-testing or held in the selection
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelectedElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub page: usize,
    /// Bounding box in canvas coordinates as of the last layout
    pub canvas_rect: RectF,
}

/// Ordered selection of elements
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub elements: Vec<SelectedElement>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id).collect()
    }

    /// Union of all selected rectangles
    pub fn canvas_rect(&self) -> RectF {
        self.elements
            .iter()
            .fold(RectF::default(), |acc, e| acc.united(&e.canvas_rect))
    }
}

/// How a click modifies the selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectMode {
    Replace,
    Add,
    Toggle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub start: PointF,
    pub current: PointF,
}

impl DragState {
    pub fn rect(&self) -> RectF {
        RectF::from_corners(self.start, self.current)
    }
}

/// An element being dragged in from a palette
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropState {
    pub kind: ElementKind,
    pub position: PointF,
}

/// Interaction sub-component
#[derive(Debug)]
pub struct NotationInteraction {
    changes: Sender<ChangeSource>,
    selection: Selection,
    selection_changed: Channel<Selection>,
    /// Elements found by hit-testing since they were last painted
    discovered: HashSet<ElementId>,
    drag: Option<DragState>,
    drop: Option<DropState>,
    text_editing: Option<ElementId>,
    note_input: bool,
    input_notes: Vec<InputNote>,
}

impl NotationInteraction {
    pub fn new(changes: Sender<ChangeSource>) -> Self {
        Self {
            changes,
            selection: Selection::default(),
            selection_changed: Channel::new(),
            discovered: HashSet::new(),
            drag: None,
            drop: None,
            text_editing: None,
            note_input: false,
            input_notes: Vec::new(),
        }
    }

    /// Reset all transient state for a newly attached score
    pub fn init(&mut self) {
        self.discovered.clear();
        self.drag = None;
        self.drop = None;
        self.text_editing = None;
        self.note_input = false;
        self.input_notes.clear();
        self.set_selection(Selection::default());
    }

    // ========================================================================
    // Hit-testing
    // ========================================================================

    /// Visible elements under `point` (canvas coordinates), topmost first
    ///
    /// Every hit is added to the discovered set until its next repaint.
    pub fn hit_test(&mut self, score: &dyn ScoreEngine, point: PointF) -> Vec<SelectedElement> {
        let mut hits = Vec::new();

        for page in shown_pages(score) {
            if !page.canvas_bounding_rect().contains(point) {
                continue;
            }
            let origin = page.pos();
            for element in page.elements() {
                if !element.visible() {
                    continue;
                }
                let rect = element.bbox().translated(origin + element.page_pos());
                if rect.contains(point) {
                    hits.push(SelectedElement {
                        id: element.id(),
                        kind: element.kind(),
                        page: page.index(),
                        canvas_rect: rect,
                    });
                }
            }
        }

        // Later elements are painted on top
        hits.reverse();
        self.discovered.extend(hits.iter().map(|h| h.id));
        hits
    }

    pub fn is_discovered(&self, id: ElementId) -> bool {
        self.discovered.contains(&id)
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    /// Called by the painter for each element it draws
    pub(crate) fn forget_discovered(&mut self, id: ElementId) {
        self.discovered.remove(&id);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Fires with the new selection whenever it changes
    pub fn selection_changed(&self) -> &Channel<Selection> {
        &self.selection_changed
    }

    /// Select the topmost element at `point`; returns it, or `None` on empty space
    ///
    /// Clicking empty space in `Replace` mode clears the selection.
    pub fn select_at(
        &mut self,
        score: &dyn ScoreEngine,
        point: PointF,
        mode: SelectMode,
    ) -> Option<ElementId> {
        let hit = self.hit_test(score, point).into_iter().next();

        let mut selection = self.selection.clone();
        match (&hit, mode) {
            (None, SelectMode::Replace) => selection.elements.clear(),
            (None, _) => {}
            (Some(element), SelectMode::Replace) => selection.elements = vec![element.clone()],
            (Some(element), SelectMode::Add) => {
                if !selection.contains(element.id) {
                    selection.elements.push(element.clone());
                }
            }
            (Some(element), SelectMode::Toggle) => {
                if selection.contains(element.id) {
                    selection.elements.retain(|e| e.id != element.id);
                } else {
                    selection.elements.push(element.clone());
                }
            }
        }
        self.set_selection(selection);

        hit.map(|h| h.id)
    }

    /// Select every visible element intersecting `rect` (canvas coordinates)
    pub fn select_in_rect(&mut self, score: &dyn ScoreEngine, rect: RectF) -> usize {
        let mut selection = Selection::default();
        for page in shown_pages(score) {
            if !page.canvas_bounding_rect().intersects(&rect) {
                continue;
            }
            let origin = page.pos();
            for element in page.elements() {
                if !element.visible() {
                    continue;
                }
                let element_rect = element.bbox().translated(origin + element.page_pos());
                if element_rect.intersects(&rect) {
                    selection.elements.push(SelectedElement {
                        id: element.id(),
                        kind: element.kind(),
                        page: page.index(),
                        canvas_rect: element_rect,
                    });
                }
            }
        }
        let count = selection.len();
        self.set_selection(selection);
        count
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::default());
    }

    /// Re-resolve the selection against the current layout
    ///
    /// Called after anything that relayouts the score. Elements that are no
    /// longer shown (hidden, removed, or on a page the view mode does not
    /// draw) leave the selection.
    pub fn refresh_selection(&mut self, score: &dyn ScoreEngine) {
        let selection = Selection {
            elements: locate(score, &self.selection.ids()),
        };
        self.set_selection(selection);
    }

    fn set_selection(&mut self, selection: Selection) {
        if self.selection == selection {
            return;
        }
        self.selection = selection;
        self.selection_changed.send(self.selection.clone());
    }

    // ========================================================================
    // Drag
    // ========================================================================

    pub fn start_drag(&mut self, point: PointF) {
        self.drag = Some(DragState {
            start: point,
            current: point,
        });
        self.changes.send(ChangeSource::DragChanged);
    }

    /// Ignored unless a drag is in progress
    pub fn drag_to(&mut self, point: PointF) {
        if let Some(ref mut drag) = self.drag {
            drag.current = point;
            self.changes.send(ChangeSource::DragChanged);
        }
    }

    /// Finish the drag and return the dragged rectangle
    pub fn end_drag(&mut self) -> Option<RectF> {
        let drag = self.drag.take()?;
        self.changes.send(ChangeSource::DragChanged);
        Some(drag.rect())
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_rect(&self) -> Option<RectF> {
        self.drag.map(|d| d.rect())
    }

    // ========================================================================
    // Drop
    // ========================================================================

    pub fn start_drop(&mut self, kind: ElementKind, position: PointF) {
        self.drop = Some(DropState { kind, position });
        self.changes.send(ChangeSource::DropChanged);
    }

    pub fn move_drop(&mut self, position: PointF) {
        if let Some(ref mut drop) = self.drop {
            drop.position = position;
            self.changes.send(ChangeSource::DropChanged);
        }
    }

    pub fn end_drop(&mut self) -> Option<DropState> {
        let drop = self.drop.take()?;
        self.changes.send(ChangeSource::DropChanged);
        Some(drop)
    }

    pub fn drop_state(&self) -> Option<DropState> {
        self.drop
    }

    // ========================================================================
    // Text editing
    // ========================================================================

    /// Start editing a selected text or lyric element
    pub fn start_edit_text(&mut self, id: ElementId) -> bool {
        let editable = self
            .selection
            .elements
            .iter()
            .any(|e| e.id == id && matches!(e.kind, ElementKind::Text | ElementKind::Lyric));
        if !editable {
            log::debug!("Element {} is not a selected text element", id);
            return false;
        }
        self.text_editing = Some(id);
        self.changes.send(ChangeSource::TextEditingChanged);
        true
    }

    pub fn end_edit_text(&mut self) {
        if self.text_editing.take().is_some() {
            self.changes.send(ChangeSource::TextEditingChanged);
        }
    }

    pub fn text_editing(&self) -> Option<ElementId> {
        self.text_editing
    }

    // ========================================================================
    // Note input
    // ========================================================================

    pub fn start_note_input(&mut self) {
        self.note_input = true;
    }

    pub fn end_note_input(&mut self) {
        self.note_input = false;
    }

    pub fn is_note_input_mode(&self) -> bool {
        self.note_input
    }

    /// Add a note in note-input mode; returns false outside it
    pub fn add_note(&mut self, note: InputNote) -> bool {
        if !self.note_input {
            return false;
        }
        self.input_notes.push(note);
        self.changes.send(ChangeSource::NoteAdded);
        true
    }

    pub fn input_notes(&self) -> &[InputNote] {
        &self.input_notes
    }

    // ========================================================================
    // Overlay
    // ========================================================================

    /// Draw transient overlays in canvas coordinates
    ///
    /// Selection frames follow the live element positions in `score`.
    pub fn paint(&self, score: &dyn ScoreEngine, surface: &mut dyn Surface, config: &NotationConfiguration) {
        if !self.selection.is_empty() {
            surface.set_pen(Pen::cosmetic(config.selection_color));
            surface.set_brush(Brush::None);
            for element in locate(score, &self.selection.ids()) {
                surface.draw_rect(element.canvas_rect);
            }
        }

        if let Some(rect) = self.drag_rect() {
            let fill = config.drag_rect_color;
            surface.set_pen(Pen::cosmetic(Color::rgb(fill.r, fill.g, fill.b)));
            surface.set_brush(Brush::Solid(fill));
            surface.draw_rect(rect);
        }

        if let Some(drop) = self.drop {
            let half = DROP_MARKER_SIZE / 2.0;
            surface.set_pen(Pen::cosmetic(config.selection_color));
            surface.set_brush(Brush::None);
            surface.draw_rect(RectF::new(
                drop.position.x - half,
                drop.position.y - half,
                DROP_MARKER_SIZE,
                DROP_MARKER_SIZE,
            ));
        }
    }
}

/// Shown, visible elements with the given ids, in the order of `ids`
fn locate(score: &dyn ScoreEngine, ids: &[ElementId]) -> Vec<SelectedElement> {
    if ids.is_empty() {
        return Vec::new();
    }

    let mut found = Vec::with_capacity(ids.len());
    for page in shown_pages(score) {
        let origin = page.pos();
        for element in page.elements() {
            if element.visible() && ids.contains(&element.id()) {
                found.push(SelectedElement {
                    id: element.id(),
                    kind: element.kind(),
                    page: page.index(),
                    canvas_rect: element.bbox().translated(origin + element.page_pos()),
                });
            }
        }
    }
    found.sort_by_key(|e| ids.iter().position(|id| *id == e.id));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MemoryScore, Shape};
    use crate::models::{Margins, SizeF, ViewMode};
    use crate::notify::ChangeFanIn;
    use crate::renderers::display_list::RecordingSurface;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn score_with_overlap() -> (MemoryScore, ElementId, ElementId) {
        let mut score = MemoryScore::new("Test");
        score.add_page(SizeF::new(200.0, 200.0), Margins::uniform(10.0));
        let below = score
            .add_element(0, ElementKind::StaffLine, PointF::new(10.0, 50.0), Shape::Rect { width: 100.0, height: 10.0, filled: false })
            .unwrap();
        let above = score
            .add_element(0, ElementKind::Note, PointF::new(40.0, 48.0), Shape::Ellipse { width: 10.0, height: 8.0, filled: true })
            .unwrap();
        (score, below, above)
    }

    #[test]
    fn test_hit_test_is_topmost_first_and_discovers() {
        let (score, below, above) = score_with_overlap();
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());

        let hits = interaction.hit_test(&score, PointF::new(45.0, 52.0));
        let ids: Vec<ElementId> = hits.iter().map(|h| h.id).collect();

        assert_eq!(ids, vec![above, below]);
        assert!(interaction.is_discovered(above));
        assert!(interaction.is_discovered(below));
        assert_eq!(hits[0].canvas_rect, RectF::new(40.0, 48.0, 10.0, 8.0));
    }

    #[test]
    fn test_select_modes() {
        let (score, below, above) = score_with_overlap();
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());

        assert_eq!(interaction.select_at(&score, PointF::new(45.0, 52.0), SelectMode::Replace), Some(above));
        interaction.select_at(&score, PointF::new(100.0, 55.0), SelectMode::Add);
        assert_eq!(interaction.selection().ids(), vec![above, below]);

        interaction.select_at(&score, PointF::new(45.0, 52.0), SelectMode::Toggle);
        assert_eq!(interaction.selection().ids(), vec![below]);

        assert_eq!(interaction.select_at(&score, PointF::new(190.0, 190.0), SelectMode::Replace), None);
        assert!(interaction.selection().is_empty());
    }

    #[test]
    fn test_selection_changed_fires_only_on_change() {
        let (score, _, _) = score_with_overlap();
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());
        let fired = Rc::new(RefCell::new(0));

        let f = Rc::clone(&fired);
        interaction.selection_changed().subscribe(move |_| *f.borrow_mut() += 1);

        interaction.select_at(&score, PointF::new(45.0, 52.0), SelectMode::Replace);
        interaction.select_at(&score, PointF::new(45.0, 52.0), SelectMode::Replace);
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn test_drag_emits_and_paints_rubber_band() {
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());

        interaction.start_drag(PointF::new(10.0, 10.0));
        interaction.drag_to(PointF::new(30.0, 40.0));
        assert_eq!(fan_in.received(), 2);

        let mut surface = RecordingSurface::new();
        let score = MemoryScore::new("Empty");
        interaction.paint(&score, &mut surface, &NotationConfiguration::default());
        assert_eq!(surface.display_list().count_rects(), 1);

        assert_eq!(interaction.end_drag(), Some(RectF::new(10.0, 10.0, 20.0, 30.0)));
        assert_eq!(fan_in.received(), 3);
        assert!(interaction.end_drag().is_none());
    }

    #[test]
    fn test_text_editing_requires_selected_text() {
        let mut score = MemoryScore::new("Test");
        score.add_page(SizeF::new(200.0, 200.0), Margins::default());
        let lyric = score
            .add_element(0, ElementKind::Lyric, PointF::new(10.0, 100.0), Shape::Text { text: "la".into(), size: 10.0 })
            .unwrap();
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());

        assert!(!interaction.start_edit_text(lyric));
        interaction.select_at(&score, PointF::new(12.0, 95.0), SelectMode::Replace);
        assert!(interaction.start_edit_text(lyric));
        assert_eq!(interaction.text_editing(), Some(lyric));

        interaction.end_edit_text();
        interaction.end_edit_text();
        assert_eq!(fan_in.received(), 2);
    }

    #[test]
    fn test_add_note_only_in_note_input_mode() {
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());
        let note = InputNote { channel: 0, pitch: 60, velocity: 90 };

        assert!(!interaction.add_note(note));
        interaction.start_note_input();
        assert!(interaction.add_note(note));
        assert_eq!(interaction.input_notes(), &[note]);
        assert_eq!(fan_in.received(), 1);
    }

    #[test]
    fn test_init_clears_transient_state() {
        let (score, _, _) = score_with_overlap();
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());

        interaction.select_at(&score, PointF::new(45.0, 52.0), SelectMode::Replace);
        interaction.start_drag(PointF::default());
        interaction.start_note_input();
        interaction.init();

        assert!(interaction.selection().is_empty());
        assert!(!interaction.is_dragging());
        assert!(!interaction.is_note_input_mode());
        assert_eq!(interaction.discovered_count(), 0);
    }

    fn two_page_score() -> (MemoryScore, ElementId) {
        let mut score = MemoryScore::new("Test");
        score.add_page(SizeF::new(200.0, 200.0), Margins::default());
        score.add_page(SizeF::new(200.0, 200.0), Margins::default());
        let on_second = score
            .add_element(1, ElementKind::Note, PointF::new(20.0, 20.0), Shape::Rect { width: 10.0, height: 10.0, filled: true })
            .unwrap();
        (score, on_second)
    }

    #[test]
    fn test_hit_test_ignores_pages_not_shown() {
        let (mut score, on_second) = two_page_score();
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());
        let point = PointF::new(275.0, 25.0);

        assert_eq!(interaction.hit_test(&score, point)[0].id, on_second);

        score.set_layout_mode(ViewMode::System);
        score.do_layout();
        // Page 1 is now below page 0 but System mode only draws page 0
        assert!(interaction.hit_test(&score, PointF::new(25.0, 225.0)).is_empty());
        assert_eq!(interaction.select_in_rect(&score, RectF::new(0.0, 0.0, 1000.0, 1000.0)), 0);
    }

    #[test]
    fn test_selection_follows_relayout() {
        let (mut score, on_second) = two_page_score();
        let fan_in = ChangeFanIn::new();
        let mut interaction = NotationInteraction::new(fan_in.sender());
        interaction.select_at(&score, PointF::new(275.0, 25.0), SelectMode::Replace);

        score.pages[1].pos = PointF::new(300.0, 40.0);
        let mut surface = RecordingSurface::new();
        interaction.paint(&score, &mut surface, &NotationConfiguration::default());
        assert_eq!(
            surface.display_list().commands.last(),
            Some(&crate::renderers::display_list::DrawCommand::DrawRect { rect: RectF::new(320.0, 60.0, 10.0, 10.0) })
        );

        interaction.refresh_selection(&score);
        assert_eq!(interaction.selection().elements[0].canvas_rect, RectF::new(320.0, 60.0, 10.0, 10.0));

        score.set_layout_mode(ViewMode::Line);
        interaction.refresh_selection(&score);
        assert!(!interaction.selection().contains(on_second));
    }
}
