//! Notation orchestrator
//!
//! A [`Notation`] owns one score and the sub-components working on it
//! (interaction, playback, MIDI input, undo, style, parts, accessibility,
//! element queries). Sub-components never point back at the notation: they
//! report changes through send-only channels that the notation fans in and
//! republishes as one payload-free `notation_changed` notification.

pub mod accessibility;
pub mod elements;
pub mod interaction;
pub mod midi_input;
pub mod paint;
pub mod parts;
pub mod playback;
pub mod style;

use std::fmt;

use crate::config::{NotationConfiguration, NudgeStep, DEFAULT_CONFIGURATION};
use crate::engine::{ScoreEngine, StyleId, StyleValue};
use crate::error::{HistoryError, Result};
use crate::models::meta::{parse_creation_date, META_KEYS};
use crate::models::{ElementId, Meta, NudgeDirection, PointF, RectF, SizeF, ViewMode};
use crate::notify::{ChangeFanIn, ChangeSource, Notification, Sender, ValCh};
use crate::renderers::surface::Surface;
use crate::undo::{NotationUndoStack, ScoreCommand};

pub use accessibility::NotationAccessibility;
pub use elements::{ElementInfo, NotationElements};
pub use interaction::{NotationInteraction, SelectMode, SelectedElement, Selection};
pub use midi_input::{InputNote, NotationMidiInput};
pub use paint::{PagePolicy, PaintStats};
pub use parts::{NotationParts, Part, PartId};
pub use playback::{NotationPlayback, PlaybackState};
pub use style::NotationStyle;

use paint::PagePainter;

/// A loaded score plus everything the editor needs to show and edit it
pub struct Notation {
    config: NotationConfiguration,
    score: Option<Box<dyn ScoreEngine>>,
    view_size: SizeF,
    opened: ValCh<bool>,

    fan_in: ChangeFanIn,
    changes: Sender<ChangeSource>,

    undo_stack: NotationUndoStack,
    interaction: NotationInteraction,
    playback: NotationPlayback,
    midi_input: NotationMidiInput,
    accessibility: NotationAccessibility,
    parts: NotationParts,
    style: NotationStyle,
    elements: NotationElements,

    last_paint: PaintStats,
}

impl fmt::Debug for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notation")
            .field("has_score", &self.score.is_some())
            .field("view_size", &self.view_size)
            .field("opened", self.opened.val())
            .field("fan_in", &self.fan_in)
            .finish_non_exhaustive()
    }
}

impl Default for Notation {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIGURATION.clone(), None)
    }
}

impl Notation {
    /// Build the sub-components, wire their change channels into one
    /// notification and attach the optional initial score
    pub fn new(config: NotationConfiguration, score: Option<Box<dyn ScoreEngine>>) -> Self {
        let fan_in = ChangeFanIn::new();

        let interaction = NotationInteraction::new(fan_in.sender());
        let accessibility = NotationAccessibility::new(interaction.selection_changed());
        let parts = NotationParts::new(interaction.selection_changed(), fan_in.sender());

        let mut notation = Self {
            config,
            score: None,
            view_size: SizeF::default(),
            opened: ValCh::new(false),
            changes: fan_in.sender(),
            undo_stack: NotationUndoStack::default(),
            interaction,
            playback: NotationPlayback::new(),
            midi_input: NotationMidiInput::new(fan_in.sender()),
            accessibility,
            parts,
            style: NotationStyle::new(fan_in.sender()),
            elements: NotationElements::new(),
            fan_in,
            last_paint: PaintStats::default(),
        };
        notation.set_score(score);
        notation
    }

    /// Notation over `score` with the default configuration
    pub fn with_score(score: Box<dyn ScoreEngine>) -> Self {
        Self::new(DEFAULT_CONFIGURATION.clone(), Some(score))
    }

    /// Replace the attached score; `None` detaches it
    ///
    /// Undo history belongs to the previous score and is dropped.
    pub fn set_score(&mut self, score: Option<Box<dyn ScoreEngine>>) {
        self.score = score;
        self.undo_stack.clear();

        if let Some(score) = self.score.as_deref() {
            log::info!("Attached score '{}' ({} page(s))", score.title(), score.pages().len());
            self.interaction.init();
            self.playback.init();
        }
    }

    pub fn configuration(&self) -> &NotationConfiguration {
        &self.config
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Score metadata; empty when no score is attached
    pub fn meta_info(&self) -> Meta {
        let Some(score) = self.score.as_deref() else {
            return Meta::default();
        };

        let [subtitle, composer, lyricist, copyright, translator, arranger, creation_date] =
            META_KEYS.map(|key| score.meta_tag(key));

        Meta {
            title: score.title(),
            subtitle,
            composer,
            lyricist,
            copyright,
            translator,
            arranger,
            creation_date: parse_creation_date(&creation_date),
        }
    }

    /// Write the seven metadata tags back to the score as one undo step
    ///
    /// The title is not written. Does nothing when no score is attached.
    pub fn set_meta_info(&mut self, meta: &Meta) {
        let Some(score) = self.score.as_deref_mut() else {
            return;
        };

        let own_transaction = !self.undo_stack.is_preparing();
        if own_transaction {
            self.undo_stack.prepare_changes();
        }
        for (key, value) in meta.tags() {
            let old = score.meta_tag(key);
            self.undo_stack.push(
                score,
                ScoreCommand::SetMetaTag {
                    key: key.to_string(),
                    old,
                    new: value,
                },
            );
        }
        if own_transaction {
            self.undo_stack.commit_changes();
        }
    }

    /// Independent notation over a deep copy of the score
    pub fn clone_notation(&self) -> Option<Notation> {
        let score = self.score.as_deref()?.clone_score();
        Some(Notation::new(self.config.clone(), Some(score)))
    }

    // ========================================================================
    // View
    // ========================================================================

    pub fn set_view_size(&mut self, size: SizeF) {
        self.view_size = size;
    }

    pub fn view_size(&self) -> SizeF {
        self.view_size
    }

    /// Switch layout mode and relayout synchronously
    ///
    /// Blocks for a full relayout of the score. No-op without a score.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        let Some(score) = self.score.as_deref_mut() else {
            return;
        };

        score.set_layout_mode(mode);
        score.do_layout();
        self.refresh_selection();
        self.changes.send(ChangeSource::ViewModeChanged);
    }

    /// Layout mode of the score, `Page` when no score is attached
    pub fn view_mode(&self) -> ViewMode {
        self.score
            .as_deref()
            .map_or(ViewMode::Page, |score| score.layout_mode())
    }

    /// Bounding box of the first page, or the empty rect
    pub fn preview_rect(&self) -> RectF {
        self.score
            .as_deref()
            .and_then(|score| score.pages().first().map(|page| page.bbox()))
            .unwrap_or_default()
    }

    /// Paint the visible part of the score, then the interaction overlay
    pub fn paint(&mut self, surface: &mut dyn Surface, visible_region: RectF) -> PaintStats {
        let Some(score) = self.score.as_deref() else {
            return PaintStats::default();
        };

        let stats = PagePainter {
            score,
            config: &self.config,
            interaction: &mut self.interaction,
        }
        .paint(surface, visible_region);

        log::trace!("Painted {:?}", stats);
        self.last_paint = stats;
        stats
    }

    /// Counters of the most recent paint
    pub fn last_paint_stats(&self) -> PaintStats {
        self.last_paint
    }

    // ========================================================================
    // Opened state and change notification
    // ========================================================================

    pub fn opened(&self) -> &ValCh<bool> {
        &self.opened
    }

    /// Setting the current value does not notify
    pub fn set_opened(&mut self, opened: bool) {
        self.opened.set(opened);
    }

    /// Fires whenever anything about the notation changed
    pub fn notation_changed(&self) -> &Notification {
        self.fan_in.changed()
    }

    // ========================================================================
    // Operations needing the score
    // ========================================================================

    pub fn undo(&mut self) -> Result<()> {
        let score = self.score.as_deref_mut().ok_or(HistoryError::NoScore)?;
        self.undo_stack.undo(score)?;
        self.refresh_selection();
        self.changes.send(ChangeSource::HistoryApplied);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let score = self.score.as_deref_mut().ok_or(HistoryError::NoScore)?;
        self.undo_stack.redo(score)?;
        self.refresh_selection();
        self.changes.send(ChangeSource::HistoryApplied);
        Ok(())
    }

    /// Feed a live MIDI message; in note-input mode a pressed note is added
    pub fn handle_midi(&mut self, bytes: &[u8]) -> Result<Option<InputNote>> {
        let note = self.midi_input.on_midi_bytes(bytes)?;
        if let Some(note) = note {
            if self.interaction.is_note_input_mode() {
                self.interaction.add_note(note);
            }
        }
        Ok(note)
    }

    /// Elements under `point` (canvas coordinates), topmost first
    pub fn hit_test(&mut self, point: PointF) -> Vec<SelectedElement> {
        match self.score.as_deref() {
            Some(score) => self.interaction.hit_test(score, point),
            None => Vec::new(),
        }
    }

    pub fn select_at(&mut self, point: PointF, mode: SelectMode) -> Option<ElementId> {
        let score = self.score.as_deref()?;
        self.interaction.select_at(score, point, mode)
    }

    pub fn select_in_rect(&mut self, rect: RectF) -> usize {
        match self.score.as_deref() {
            Some(score) => self.interaction.select_in_rect(score, rect),
            None => 0,
        }
    }

    pub fn style_value(&self, id: StyleId) -> Option<StyleValue> {
        let score = self.score.as_deref()?;
        Some(self.style.style_value(score, id))
    }

    /// Change a style value as one undo step; false if unchanged or no score
    pub fn set_style_value(&mut self, id: StyleId, value: StyleValue) -> bool {
        let Some(score) = self.score.as_deref_mut() else {
            return false;
        };
        let changed = self.style.set_style_value(score, &mut self.undo_stack, id, value);
        if changed {
            self.refresh_selection();
        }
        changed
    }

    /// Move every selected element one nudge step, as one undo step
    ///
    /// The step is scaled by the score's spatium. Returns false when nothing
    /// is selected or no score is attached.
    pub fn nudge_selection(&mut self, direction: NudgeDirection, step: NudgeStep) -> bool {
        let Some(score) = self.score.as_deref_mut() else {
            return false;
        };
        let ids = self.interaction.selection().ids();
        if ids.is_empty() {
            return false;
        }

        let spatium = self
            .style
            .style_value(score, StyleId::Spatium)
            .as_f64()
            .unwrap_or_default();
        let distance = self.config.nudge_distance(step) * spatium;
        let (dx, dy) = direction.unit();
        let delta = PointF::new(dx * distance, dy * distance);

        let own_transaction = !self.undo_stack.is_preparing();
        if own_transaction {
            self.undo_stack.prepare_changes();
        }
        for id in ids {
            self.undo_stack.push(score, ScoreCommand::MoveElement { id, delta });
        }
        if own_transaction {
            self.undo_stack.commit_changes();
        }

        self.refresh_selection();
        self.changes.send(ChangeSource::ElementsMoved);
        true
    }

    /// Re-resolve the cached selection rects after the score moved things
    fn refresh_selection(&mut self) {
        if let Some(score) = self.score.as_deref() {
            self.interaction.refresh_selection(score);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn interaction(&self) -> &NotationInteraction {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut NotationInteraction {
        &mut self.interaction
    }

    pub fn midi_input(&self) -> &NotationMidiInput {
        &self.midi_input
    }

    pub fn undo_stack(&self) -> &NotationUndoStack {
        &self.undo_stack
    }

    pub fn elements(&self) -> &NotationElements {
        &self.elements
    }

    pub fn style(&self) -> &NotationStyle {
        &self.style
    }

    pub fn playback(&self) -> &NotationPlayback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut NotationPlayback {
        &mut self.playback
    }

    pub fn accessibility(&self) -> &NotationAccessibility {
        &self.accessibility
    }

    pub fn parts(&self) -> &NotationParts {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut NotationParts {
        &mut self.parts
    }

    pub fn score(&self) -> Option<&dyn ScoreEngine> {
        self.score.as_deref()
    }

    pub fn score_mut(&mut self) -> Option<&mut (dyn ScoreEngine + 'static)> {
        self.score.as_deref_mut()
    }
}
