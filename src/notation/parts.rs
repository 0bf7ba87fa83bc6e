//! Parts (instruments) of the notation
//!
//! Keeps the ordered part list and which parts the current selection touches.
//! Selection updates arrive through the interaction's selection channel.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::interaction::Selection;
use crate::models::ElementId;
use crate::notify::{ChangeSource, Channel, Sender};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PartId(pub u32);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub visible: bool,
    /// Elements engraved for this part
    pub elements: BTreeSet<ElementId>,
}

#[derive(Debug, Default)]
struct PartsState {
    parts: Vec<Part>,
    next_id: u32,
    selected: Vec<PartId>,
}

impl PartsState {
    fn parts_for(&self, selection: &Selection) -> Vec<PartId> {
        self.parts
            .iter()
            .filter(|p| selection.elements.iter().any(|e| p.elements.contains(&e.id)))
            .map(|p| p.id)
            .collect()
    }
}

/// Parts sub-component
#[derive(Debug)]
pub struct NotationParts {
    changes: Sender<ChangeSource>,
    state: Rc<RefCell<PartsState>>,
}

impl NotationParts {
    pub fn new(selection_changed: &Channel<Selection>, changes: Sender<ChangeSource>) -> Self {
        let state = Rc::new(RefCell::new(PartsState::default()));

        let listener = Rc::clone(&state);
        selection_changed.subscribe(move |selection: &Selection| {
            let mut state = listener.borrow_mut();
            state.selected = state.parts_for(selection);
        });

        Self { changes, state }
    }

    pub fn parts(&self) -> Vec<Part> {
        self.state.borrow().parts.clone()
    }

    pub fn part(&self, id: PartId) -> Option<Part> {
        self.state.borrow().parts.iter().find(|p| p.id == id).cloned()
    }

    /// Parts owning at least one selected element, in part order
    pub fn selected_parts(&self) -> Vec<PartId> {
        self.state.borrow().selected.clone()
    }

    pub fn add_part(&mut self, name: impl Into<String>) -> PartId {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = PartId(state.next_id);
            state.next_id += 1;
            state.parts.push(Part {
                id,
                name: name.into(),
                visible: true,
                elements: BTreeSet::new(),
            });
            id
        };
        self.changes.send(ChangeSource::PartsChanged);
        id
    }

    pub fn remove_part(&mut self, id: PartId) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.parts.len();
            state.parts.retain(|p| p.id != id);
            state.selected.retain(|p| *p != id);
            state.parts.len() != before
        };
        if removed {
            self.changes.send(ChangeSource::PartsChanged);
        }
        removed
    }

    pub fn set_part_name(&mut self, id: PartId, name: &str) -> bool {
        self.update(id, |part| {
            if part.name == name {
                return false;
            }
            part.name = name.to_string();
            true
        })
    }

    pub fn set_part_visible(&mut self, id: PartId, visible: bool) -> bool {
        self.update(id, |part| {
            if part.visible == visible {
                return false;
            }
            part.visible = visible;
            true
        })
    }

    /// Attach engraved elements to a part
    pub fn assign_elements(&mut self, id: PartId, elements: impl IntoIterator<Item = ElementId>) -> bool {
        let elements: Vec<ElementId> = elements.into_iter().collect();
        self.update(id, |part| {
            let before = part.elements.len();
            part.elements.extend(elements.iter().copied());
            part.elements.len() != before
        })
    }

    /// Move a part to `to_index` (clamped to the list)
    pub fn move_part(&mut self, id: PartId, to_index: usize) -> bool {
        let moved = {
            let mut state = self.state.borrow_mut();
            match state.parts.iter().position(|p| p.id == id) {
                Some(from) => {
                    let to = to_index.min(state.parts.len() - 1);
                    if from == to {
                        false
                    } else {
                        let part = state.parts.remove(from);
                        state.parts.insert(to, part);
                        true
                    }
                }
                None => false,
            }
        };
        if moved {
            self.changes.send(ChangeSource::PartsChanged);
        }
        moved
    }

    fn update(&mut self, id: PartId, f: impl FnOnce(&mut Part) -> bool) -> bool {
        let changed = {
            let mut state = self.state.borrow_mut();
            state.parts.iter_mut().find(|p| p.id == id).map_or(false, f)
        };
        if changed {
            self.changes.send(ChangeSource::PartsChanged);
        }
        changed
    }
}
