//! Focus trap for an open dialog
//!
//! While active, Tab and Shift+Tab cycle through the tabbable descendants of
//! the dialog container only, the page's main region is hidden from
//! assistive tech, and page scrolling is locked. Deactivation undoes all of
//! it and hands focus back to whatever held it before activation.

use crossterm::event::KeyEvent;
use tracing::debug;

use crate::ui::{
    document::{aria, Document, NodeId, Role},
    keyboard::FocusKey,
};

#[derive(Debug, Clone)]
struct HiddenBackground {
    node: NodeId,
    previous: Option<String>,
}

#[derive(Debug, Default)]
pub struct FocusTrap {
    container: Option<NodeId>,
    memento: Option<NodeId>,
    hidden: Option<HiddenBackground>,
}

impl FocusTrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.container.is_some()
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Trap focus inside `container` and focus `initial_focus` (the title)
    pub fn activate(&mut self, doc: &mut Document, container: NodeId, initial_focus: NodeId) {
        if self.is_active() {
            debug!("Focus trap already active, ignoring activation");
            return;
        }

        self.memento = doc.active_element();
        self.container = Some(container);

        if let Some(main) = doc.find_by_role(Role::Main) {
            let previous = doc.attribute(main, aria::HIDDEN).map(str::to_string);
            doc.set_attribute(main, aria::HIDDEN, "true");
            self.hidden = Some(HiddenBackground { node: main, previous });
        }

        doc.set_scroll_locked(true);

        if !doc.focus(initial_focus) {
            debug!("Initial focus target {:?} is not focusable", initial_focus);
        }
        debug!(
            "Focus trap activated on {:?}, memento {:?}",
            container, self.memento
        );
    }

    /// Handle Tab/Shift+Tab; returns true when the key was consumed
    ///
    /// The tabbable set is recomputed on every call so fields added or
    /// disabled while the dialog is open are respected.
    pub fn handle_key(&self, doc: &mut Document, key: &KeyEvent) -> bool {
        let Some(container) = self.container else {
            return false;
        };
        let Some(direction) = FocusKey::from_event(key) else {
            return false;
        };

        let focusable = doc.focusable_descendants(container);
        let (Some(&first), Some(&last)) = (focusable.first(), focusable.last()) else {
            return false;
        };

        let position = doc
            .active_element()
            .and_then(|active| focusable.iter().position(|&id| id == active));

        let target = match (direction, position) {
            (FocusKey::Previous, None) | (FocusKey::Previous, Some(0)) => last,
            (FocusKey::Previous, Some(index)) => focusable[index - 1],
            (FocusKey::Next, None) => first,
            (FocusKey::Next, Some(index)) if index + 1 == focusable.len() => first,
            (FocusKey::Next, Some(index)) => focusable[index + 1],
        };

        doc.focus(target)
    }

    /// Release the trap and restore the page
    pub fn deactivate(&mut self, doc: &mut Document) {
        if self.container.take().is_none() {
            return;
        }

        if let Some(hidden) = self.hidden.take() {
            match hidden.previous {
                Some(value) => doc.set_attribute(hidden.node, aria::HIDDEN, value),
                None => {
                    doc.remove_attribute(hidden.node, aria::HIDDEN);
                }
            }
        }

        doc.set_scroll_locked(false);

        let restored = match self.memento.take() {
            Some(previous) if doc.is_attached(previous) => doc.focus(previous),
            _ => false,
        };
        if restored {
            debug!("Focus restored to previous element");
        } else {
            doc.blur();
            debug!("Focus memento gone, focus returns to body");
        }
    }
}
