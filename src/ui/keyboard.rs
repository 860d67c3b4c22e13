//! Unified keyboard shortcuts and key mappings
//!
//! Central place for the keys the page and the modal react to, so the
//! focus trap, the escape handler and the form agree on what a key means.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Sequential focus movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusKey {
    /// Tab
    Next,
    /// Shift+Tab
    Previous,
}

impl FocusKey {
    /// Classify a key event as a focus movement
    ///
    /// Terminals report Shift+Tab either as `BackTab` or as `Tab` with SHIFT.
    pub fn from_event(key: &KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::BackTab => Some(FocusKey::Previous),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(FocusKey::Previous)
            }
            KeyCode::Tab => Some(FocusKey::Next),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusKey::Next => "Tab",
            FocusKey::Previous => "Shift+Tab",
        }
    }
}

/// Option cycling inside a select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKey {
    Up,
    Down,
    Left,
    Right,
}

impl NavigationKey {
    /// Check if a key event matches this navigation key
    pub fn matches(&self, key: &KeyEvent) -> bool {
        match self {
            NavigationKey::Up => matches!(key.code, KeyCode::Up),
            NavigationKey::Down => matches!(key.code, KeyCode::Down),
            NavigationKey::Left => matches!(key.code, KeyCode::Left),
            NavigationKey::Right => matches!(key.code, KeyCode::Right),
        }
    }

    /// Step applied to a selected index
    pub fn step(&self) -> isize {
        match self {
            NavigationKey::Up | NavigationKey::Left => -1,
            NavigationKey::Down | NavigationKey::Right => 1,
        }
    }
}

/// Action shortcuts used by the page and the modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKey {
    Confirm,  // Enter
    Cancel,   // Esc
    Activate, // Space
    Clear,    // Ctrl+U
    Quit,     // q
}

impl ActionKey {
    /// Check if a key event matches this action key
    pub fn matches(&self, key: &KeyEvent) -> bool {
        match self {
            ActionKey::Confirm => matches!(key.code, KeyCode::Enter),
            ActionKey::Cancel => matches!(key.code, KeyCode::Esc),
            ActionKey::Activate => matches!(key.code, KeyCode::Char(' ')),
            ActionKey::Clear => {
                matches!(key.code, KeyCode::Char('u'))
                    && key.modifiers.contains(KeyModifiers::CONTROL)
            }
            ActionKey::Quit => {
                matches!(key.code, KeyCode::Char('q'))
                    && !key.modifiers.contains(KeyModifiers::CONTROL)
            }
        }
    }

    /// Get the key representation as string
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKey::Confirm => "Enter",
            ActionKey::Cancel => "Esc",
            ActionKey::Activate => "Space",
            ActionKey::Clear => "Ctrl+U",
            ActionKey::Quit => "q",
        }
    }

    /// Get the description of what this key does
    pub fn description(&self) -> &'static str {
        match self {
            ActionKey::Confirm => "Submit",
            ActionKey::Cancel => "Close",
            ActionKey::Activate => "Press button",
            ActionKey::Clear => "Clear field",
            ActionKey::Quit => "Quit",
        }
    }
}

/// Only key presses are handled; release/repeat events are dropped
pub fn is_press(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
}

/// Unified shortcut manager for consistent key handling
#[derive(Debug, Default)]
pub struct ShortcutManager;

impl ShortcutManager {
    pub fn new() -> Self {
        Self
    }

    /// Footer hint shown inside the modal
    pub fn modal_help(&self) -> String {
        format!(
            "{}/{}: Move | {}: {} | {}: {} | {}: {}",
            FocusKey::Next.as_str(),
            FocusKey::Previous.as_str(),
            ActionKey::Confirm.as_str(),
            ActionKey::Confirm.description(),
            ActionKey::Cancel.as_str(),
            ActionKey::Cancel.description(),
            ActionKey::Clear.as_str(),
            ActionKey::Clear.description(),
        )
    }

    /// Hint shown on the page while the modal is closed
    pub fn page_help(&self) -> String {
        format!(
            "{}/{}: Open form | {}: {}",
            ActionKey::Confirm.as_str(),
            ActionKey::Activate.as_str(),
            ActionKey::Quit.as_str(),
            ActionKey::Quit.description(),
        )
    }

    /// Check if a key event is an option-cycling key
    pub fn is_navigation_key(&self, key: &KeyEvent) -> Option<NavigationKey> {
        [
            NavigationKey::Up,
            NavigationKey::Down,
            NavigationKey::Left,
            NavigationKey::Right,
        ]
        .into_iter()
        .find(|nav_key| nav_key.matches(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_key_variants() {
        assert_eq!(
            FocusKey::from_event(&KeyEvent::from(KeyCode::Tab)),
            Some(FocusKey::Next)
        );
        assert_eq!(
            FocusKey::from_event(&KeyEvent::from(KeyCode::BackTab)),
            Some(FocusKey::Previous)
        );
        assert_eq!(
            FocusKey::from_event(&KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)),
            Some(FocusKey::Previous)
        );
        assert_eq!(FocusKey::from_event(&KeyEvent::from(KeyCode::Enter)), None);
    }

    #[test]
    fn test_action_key_matching() {
        let enter_key = KeyEvent::from(KeyCode::Enter);
        let esc_key = KeyEvent::from(KeyCode::Esc);
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);

        assert!(ActionKey::Confirm.matches(&enter_key));
        assert!(ActionKey::Cancel.matches(&esc_key));
        assert!(ActionKey::Clear.matches(&ctrl_u));
        assert!(!ActionKey::Clear.matches(&KeyEvent::from(KeyCode::Char('u'))));
    }

    #[test]
    fn test_shortcut_manager() {
        let manager = ShortcutManager::new();
        let up_key = KeyEvent::from(KeyCode::Up);
        let enter_key = KeyEvent::from(KeyCode::Enter);

        assert_eq!(manager.is_navigation_key(&up_key), Some(NavigationKey::Up));
        assert_eq!(manager.is_navigation_key(&enter_key), None);
        assert!(manager.modal_help().contains("Esc: Close"));
    }
}
