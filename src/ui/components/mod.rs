//! UI Components module
//!
//! Contains the reusable pieces drawn by the TUI: the modal shell, the form
//! widget and the host page.

pub mod form;
pub mod modals;
pub mod page;

pub use form::{FormCallbacks, FormControl, FormWidget};
pub use modals::ModalShell;
pub use page::Page;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::{
    error::AppResult,
    ui::{document::Document, theme::Theme},
};

/// Whether a component acted on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Consumed,
}

impl EventOutcome {
    pub fn is_consumed(&self) -> bool {
        matches!(self, EventOutcome::Consumed)
    }
}

/// Trait for UI components that can render and handle events
pub trait Component {
    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, doc: &Document, theme: &Theme);

    /// Handle key events
    fn handle_key_event(&mut self, key: KeyEvent, doc: &mut Document) -> AppResult<EventOutcome>;
}
