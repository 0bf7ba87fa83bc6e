//! Accessibility description of the current selection

use std::cell::RefCell;
use std::rc::Rc;

use super::interaction::Selection;
use crate::notify::Channel;

/// Spoken/read-out description of a selection
pub fn describe_selection(selection: &Selection) -> String {
    match selection.elements.as_slice() {
        [] => String::new(),
        [only] => format!("{}; page {}", capitalize(only.kind.display_name()), only.page + 1),
        many => {
            let first_page = many.iter().map(|e| e.page).min().unwrap_or(0) + 1;
            let last_page = many.iter().map(|e| e.page).max().unwrap_or(0) + 1;
            if first_page == last_page {
                format!("Range selection of {} elements; page {}", many.len(), first_page)
            } else {
                format!(
                    "Range selection of {} elements; pages {} to {}",
                    many.len(),
                    first_page,
                    last_page
                )
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Accessibility sub-component
#[derive(Debug)]
pub struct NotationAccessibility {
    info: Rc<RefCell<String>>,
    info_changed: Channel<String>,
}

impl NotationAccessibility {
    pub fn new(selection_changed: &Channel<Selection>) -> Self {
        let info = Rc::new(RefCell::new(String::new()));
        let info_changed = Channel::new();

        let state = Rc::clone(&info);
        let out = info_changed.clone();
        selection_changed.subscribe(move |selection: &Selection| {
            let description = describe_selection(selection);
            {
                let mut current = state.borrow_mut();
                if *current == description {
                    return;
                }
                *current = description.clone();
            }
            out.send(description);
        });

        Self { info, info_changed }
    }

    /// Current description
    pub fn accessibility_info(&self) -> String {
        self.info.borrow().clone()
    }

    /// Fires with the new description whenever it changes
    pub fn accessibility_info_changed(&self) -> &Channel<String> {
        &self.info_changed
    }
}
