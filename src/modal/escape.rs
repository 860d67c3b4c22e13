//! Escape-to-close handling
//!
//! The close callback is held only while the handler is installed, so a
//! closed dialog can never react to Escape.

use crossterm::event::KeyEvent;
use tracing::debug;

use crate::ui::keyboard::ActionKey;

pub type CloseCallback = Box<dyn FnMut() + Send>;

#[derive(Default)]
pub struct EscapeHandler {
    on_close: Option<CloseCallback>,
}

impl std::fmt::Debug for EscapeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscapeHandler")
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl EscapeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening for Escape; replaces any callback already installed
    pub fn install(&mut self, on_close: CloseCallback) {
        if self.on_close.replace(on_close).is_some() {
            debug!("Escape handler reinstalled");
        }
    }

    pub fn uninstall(&mut self) {
        self.on_close = None;
    }

    pub fn is_installed(&self) -> bool {
        self.on_close.is_some()
    }

    /// Invoke the close callback for an Escape press; returns true if consumed
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if !ActionKey::Cancel.matches(key) {
            return false;
        }
        match self.on_close.as_mut() {
            Some(on_close) => {
                debug!("Escape pressed, closing dialog");
                on_close();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn counting() -> (Arc<AtomicUsize>, CloseCallback) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        (
            calls,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_escape_calls_once_per_press() {
        let (calls, callback) = counting();
        let mut handler = EscapeHandler::new();
        handler.install(callback);

        assert!(handler.handle_key(&KeyEvent::from(KeyCode::Esc)));
        assert!(handler.handle_key(&KeyEvent::from(KeyCode::Esc)));
        assert!(!handler.handle_key(&KeyEvent::from(KeyCode::Enter)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_uninstalled_handler_ignores_escape() {
        let (calls, callback) = counting();
        let mut handler = EscapeHandler::new();
        handler.install(callback);
        handler.uninstall();

        assert!(!handler.is_installed());
        assert!(!handler.handle_key(&KeyEvent::from(KeyCode::Esc)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
