//! `NotationView`: the notation exposed to JavaScript
//!
//! The front end loads a score description (JSON), switches view modes,
//! edits metadata and asks for display lists of the visible region, which
//! it replays onto a canvas.
//!
//! Every method takes `&self`. Change and opened notifications raised during
//! a call are queued and handed to the JavaScript listeners only after the
//! notation borrow is released, so a listener may call back into the view.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, js_error, notation_error, serialize};
use crate::config::{NotationConfiguration, NudgeStep};
use crate::engine::MemoryScore;
use crate::models::{Meta, NudgeDirection, PointF, RectF, SizeF, ViewMode};
use crate::notation::{Notation, SelectMode};
use crate::renderers::{RecordingSurface, SVGRenderer};
use crate::utils::PerformanceMonitor;

/// Notifications waiting for delivery to JavaScript
#[derive(Default)]
struct PendingEvents {
    changed: Cell<bool>,
    opened: Cell<Option<bool>>,
    dispatching: Cell<bool>,
    change_listeners: RefCell<Vec<js_sys::Function>>,
    opened_listeners: RefCell<Vec<js_sys::Function>>,
}

impl PendingEvents {
    /// Deliver queued notifications until none are left
    ///
    /// A listener that changes the view again queues a follow-up, which the
    /// outermost call delivers after the current round.
    fn dispatch(&self) {
        if self.dispatching.replace(true) {
            return;
        }

        loop {
            let changed = self.changed.replace(false);
            let opened = self.opened.take();
            if !changed && opened.is_none() {
                break;
            }

            if changed {
                let listeners = self.change_listeners.borrow().clone();
                for callback in &listeners {
                    if let Err(e) = callback.call0(&JsValue::NULL) {
                        log::error!("notation change callback failed: {:?}", e);
                    }
                }
            }
            if let Some(opened) = opened {
                let listeners = self.opened_listeners.borrow().clone();
                for callback in &listeners {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_bool(opened)) {
                        log::error!("opened callback failed: {:?}", e);
                    }
                }
            }
        }

        self.dispatching.set(false);
    }
}

#[wasm_bindgen]
pub struct NotationView {
    notation: RefCell<Notation>,
    monitor: RefCell<PerformanceMonitor>,
    events: Rc<PendingEvents>,
}

impl NotationView {
    fn dispatch_pending(&self) {
        self.events.dispatch();
    }
}

#[wasm_bindgen]
impl NotationView {
    /// Create a view over a score description
    ///
    /// # Parameters
    /// - `score_json`: score description (pages, elements, meta tags)
    /// - `config_json`: optional configuration overrides
    #[wasm_bindgen(constructor)]
    pub fn new(score_json: &str, config_json: Option<String>) -> Result<NotationView, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => NotationConfiguration::from_json(json).map_err(notation_error)?,
            None => NotationConfiguration::default(),
        };
        let score = MemoryScore::from_json(score_json).map_err(notation_error)?;
        log::info!("NotationView created for '{}'", score.title);

        let notation = Notation::new(config, Some(Box::new(score)));
        let events = Rc::new(PendingEvents::default());

        let pending = Rc::clone(&events);
        notation.notation_changed().on_notify(move || pending.changed.set(true));
        let pending = Rc::clone(&events);
        notation
            .opened()
            .ch()
            .subscribe(move |opened: &bool| pending.opened.set(Some(*opened)));

        Ok(NotationView {
            notation: RefCell::new(notation),
            monitor: RefCell::new(PerformanceMonitor::new()),
            events,
        })
    }

    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&self, mode: u8) -> Result<(), JsValue> {
        let mode = ViewMode::try_from(mode).map_err(|m| js_error(format!("Invalid view mode: {}", m)))?;
        self.monitor
            .borrow_mut()
            .measure("setViewMode", || self.notation.borrow_mut().set_view_mode(mode));
        self.dispatch_pending();
        Ok(())
    }

    #[wasm_bindgen(js_name = viewMode)]
    pub fn view_mode(&self) -> u8 {
        self.notation.borrow().view_mode() as u8
    }

    #[wasm_bindgen(js_name = metaInfo)]
    pub fn meta_info(&self) -> Result<JsValue, JsValue> {
        serialize(&self.notation.borrow().meta_info(), "Serialization error")
    }

    #[wasm_bindgen(js_name = setMetaInfo)]
    pub fn set_meta_info(&self, meta_js: JsValue) -> Result<(), JsValue> {
        let meta: Meta = deserialize(meta_js, "Deserialization error")?;
        self.notation.borrow_mut().set_meta_info(&meta);
        self.dispatch_pending();
        Ok(())
    }

    #[wasm_bindgen(js_name = previewRect)]
    pub fn preview_rect(&self) -> Result<JsValue, JsValue> {
        serialize(&self.notation.borrow().preview_rect(), "Serialization error")
    }

    #[wasm_bindgen(js_name = setViewSize)]
    pub fn set_view_size(&self, width: f64, height: f64) {
        self.notation.borrow_mut().set_view_size(SizeF::new(width, height));
    }

    /// Paint the visible region and return the display list
    pub fn paint(&self, x: f64, y: f64, width: f64, height: f64) -> Result<JsValue, JsValue> {
        let visible = RectF::new(x, y, width, height);
        let mut surface = RecordingSurface::new();
        let stats = self
            .monitor
            .borrow_mut()
            .measure("paint", || self.notation.borrow_mut().paint(&mut surface, visible));
        log::debug!(
            "paint: {} painted, {} culled, {} elements",
            stats.pages_painted,
            stats.pages_culled,
            stats.elements_painted
        );
        self.dispatch_pending();
        serialize(&surface.into_display_list(), "Serialization error")
    }

    /// Paint the visible region as an SVG document
    #[wasm_bindgen(js_name = paintSvg)]
    pub fn paint_svg(&self, x: f64, y: f64, width: f64, height: f64) -> String {
        let svg = self.monitor.borrow_mut().measure("paintSvg", || {
            SVGRenderer::render(&mut self.notation.borrow_mut(), RectF::new(x, y, width, height))
        });
        self.dispatch_pending();
        svg
    }

    #[wasm_bindgen(js_name = averagePaintMs)]
    pub fn average_paint_ms(&self) -> Option<f64> {
        self.monitor.borrow().get_average_time("paint")
    }

    pub fn opened(&self) -> bool {
        *self.notation.borrow().opened().val()
    }

    #[wasm_bindgen(js_name = setOpened)]
    pub fn set_opened(&self, opened: bool) {
        self.notation.borrow_mut().set_opened(opened);
        self.dispatch_pending();
    }

    /// Register `callback` for the coalesced change notification
    #[wasm_bindgen(js_name = onChanged)]
    pub fn on_changed(&self, callback: js_sys::Function) {
        self.events.change_listeners.borrow_mut().push(callback);
    }

    /// Register `callback(opened)` for changes of the opened flag
    #[wasm_bindgen(js_name = onOpenedChanged)]
    pub fn on_opened_changed(&self, callback: js_sys::Function) {
        self.events.opened_listeners.borrow_mut().push(callback);
    }

    /// Feed one live MIDI message; returns the pressed note, if any
    #[wasm_bindgen(js_name = handleMidi)]
    pub fn handle_midi(&self, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let note = self.notation.borrow_mut().handle_midi(bytes);
        self.dispatch_pending();
        serialize(&note.map_err(notation_error)?, "Serialization error")
    }

    /// Select the topmost element at a canvas point; `add` extends the selection
    #[wasm_bindgen(js_name = selectAt)]
    pub fn select_at(&self, x: f64, y: f64, add: bool) -> Option<f64> {
        let mode = if add { SelectMode::Add } else { SelectMode::Replace };
        let id = self.notation.borrow_mut().select_at(PointF::new(x, y), mode);
        self.dispatch_pending();
        id.map(|id| id.0 as f64)
    }

    /// Move the selection one cursor step
    ///
    /// # Parameters
    /// - `direction`: 0 left, 1 right, 2 up, 3 down
    /// - `step`: 0 normal, 1 coarse (Ctrl), 2 fine (Alt)
    pub fn nudge(&self, direction: u8, step: u8) -> Result<bool, JsValue> {
        let direction = NudgeDirection::try_from(direction)
            .map_err(|d| js_error(format!("Invalid nudge direction: {}", d)))?;
        let step = NudgeStep::try_from(step).map_err(|s| js_error(format!("Invalid nudge step: {}", s)))?;
        let moved = self.notation.borrow_mut().nudge_selection(direction, step);
        self.dispatch_pending();
        Ok(moved)
    }

    #[wasm_bindgen(js_name = accessibilityInfo)]
    pub fn accessibility_info(&self) -> String {
        self.notation.borrow().accessibility().accessibility_info()
    }

    pub fn undo(&self) -> Result<(), JsValue> {
        let result = self.notation.borrow_mut().undo();
        self.dispatch_pending();
        result.map_err(notation_error)
    }

    pub fn redo(&self) -> Result<(), JsValue> {
        let result = self.notation.borrow_mut().redo();
        self.dispatch_pending();
        result.map_err(notation_error)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.notation.borrow().undo_stack().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.notation.borrow().undo_stack().can_redo()
    }
}
