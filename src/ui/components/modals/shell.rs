//! Dialog shell
//!
//! Mounts the dialog nodes, traps focus inside them, closes on Escape or a
//! backdrop click, and draws the dialog chrome. Whatever goes inside the
//! dialog is mounted under [`ModalShell::open`]'s returned node and drawn
//! into [`ModalShell::content_area`].

use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use crate::{
    error::AppResult,
    modal::{escape::EscapeHandler, focus_trap::FocusTrap},
    ui::{
        components::{Component, EventOutcome},
        document::{aria, Document, Node, NodeId, Role},
        keyboard::ShortcutManager,
        theme::Theme,
    },
};

use super::{centered_rect, contains};

/// Called when the user dismisses the dialog
pub type CloseFn = Arc<dyn Fn() + Send + Sync>;

pub const DIALOG_ID: &str = "modal";
pub const TITLE_ID: &str = "modal-title";
pub const DESCRIPTION_ID: &str = "modal-description";

#[derive(Debug, Clone, Copy)]
struct ShellNodes {
    dialog: NodeId,
    title: NodeId,
}

pub struct ModalShell {
    title: String,
    description: Option<String>,
    on_close: CloseFn,
    close_on_backdrop_click: bool,
    width_percent: u16,
    height_percent: u16,
    focus_trap: FocusTrap,
    escape: EscapeHandler,
    nodes: Option<ShellNodes>,
    dialog_area: Option<Rect>,
    content_area: Option<Rect>,
    shortcuts: ShortcutManager,
}

impl ModalShell {
    pub fn new(title: impl Into<String>, description: Option<String>, on_close: CloseFn) -> Self {
        Self {
            title: title.into(),
            description,
            on_close,
            close_on_backdrop_click: true,
            width_percent: 60,
            height_percent: 80,
            focus_trap: FocusTrap::new(),
            escape: EscapeHandler::new(),
            nodes: None,
            dialog_area: None,
            content_area: None,
            shortcuts: ShortcutManager::new(),
        }
    }

    pub fn with_backdrop_close(mut self, enabled: bool) -> Self {
        self.close_on_backdrop_click = enabled;
        self
    }

    pub fn with_size(mut self, width_percent: u16, height_percent: u16) -> Self {
        self.width_percent = width_percent.clamp(20, 100);
        self.height_percent = height_percent.clamp(20, 100);
        self
    }

    pub fn is_open(&self) -> bool {
        self.nodes.is_some()
    }

    /// Dialog container node while open
    pub fn dialog(&self) -> Option<NodeId> {
        self.nodes.map(|n| n.dialog)
    }

    /// Title node while open
    pub fn title_node(&self) -> Option<NodeId> {
        self.nodes.map(|n| n.title)
    }

    pub fn escape_installed(&self) -> bool {
        self.escape.is_installed()
    }

    /// Area left for the dialog's content after the last render
    pub fn content_area(&self) -> Option<Rect> {
        self.content_area
    }

    /// Mount the dialog, trap focus in it, and return the content parent
    pub fn open(&mut self, doc: &mut Document) -> NodeId {
        if let Some(nodes) = self.nodes {
            return nodes.dialog;
        }

        let mut dialog_node = Node::new(Role::Dialog)
            .with_id(DIALOG_ID)
            .with_attribute(aria::MODAL, "true")
            .with_attribute(aria::LABELLEDBY, TITLE_ID);
        if self.description.is_some() {
            dialog_node = dialog_node.with_attribute(aria::DESCRIBEDBY, DESCRIPTION_ID);
        }
        let dialog = doc.append(doc.body(), dialog_node);

        let title = doc.append(
            dialog,
            Node::new(Role::Heading)
                .with_id(TITLE_ID)
                .with_text(self.title.clone())
                .with_tab_index(-1),
        );
        if let Some(description) = &self.description {
            doc.append(
                dialog,
                Node::new(Role::Paragraph)
                    .with_id(DESCRIPTION_ID)
                    .with_text(description.clone()),
            );
        }

        self.focus_trap.activate(doc, dialog, title);
        let on_close = Arc::clone(&self.on_close);
        self.escape.install(Box::new(move || on_close()));
        self.nodes = Some(ShellNodes { dialog, title });

        debug!("Modal shell opened: {}", self.title);
        dialog
    }

    /// Release focus, stop listening for Escape, and unmount the dialog
    pub fn close(&mut self, doc: &mut Document) {
        let Some(nodes) = self.nodes.take() else {
            return;
        };

        self.escape.uninstall();
        self.focus_trap.deactivate(doc);
        doc.remove(nodes.dialog);
        self.dialog_area = None;
        self.content_area = None;

        debug!("Modal shell closed: {}", self.title);
    }

    /// Close on a left click outside the dialog; returns true if consumed
    pub fn handle_mouse_event(&mut self, mouse: &MouseEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
            return false;
        };
        match self.dialog_area {
            Some(area) if !contains(area, mouse.column, mouse.row) => {
                if self.close_on_backdrop_click {
                    debug!("Backdrop clicked, closing dialog");
                    (self.on_close)();
                }
                true
            }
            _ => false,
        }
    }
}

impl Component for ModalShell {
    fn render(&mut self, frame: &mut Frame, area: Rect, doc: &Document, theme: &Theme) {
        let Some(nodes) = self.nodes else {
            return;
        };

        frame.buffer_mut().set_style(area, theme.backdrop_style());

        let dialog_area = centered_rect(self.width_percent, self.height_percent, area);
        frame.render_widget(Clear, dialog_area);

        let mut title_style = theme.title_style();
        if doc.is_focused(nodes.title) {
            title_style = title_style.add_modifier(Modifier::UNDERLINED);
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(Span::styled(format!(" {} ", self.title), title_style));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let description_height = if self.description.is_some() { 2 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(description_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        if let Some(description) = &self.description {
            let paragraph = Paragraph::new(description.as_str())
                .style(theme.muted_style())
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, chunks[0]);
        }

        let help = Paragraph::new(Line::from(self.shortcuts.modal_help()))
            .style(theme.muted_style())
            .alignment(Alignment::Center);
        frame.render_widget(help, chunks[2]);

        self.dialog_area = Some(dialog_area);
        self.content_area = Some(chunks[1]);
    }

    fn handle_key_event(&mut self, key: KeyEvent, doc: &mut Document) -> AppResult<EventOutcome> {
        if !self.is_open() {
            return Ok(EventOutcome::Ignored);
        }
        if self.escape.handle_key(&key) {
            return Ok(EventOutcome::Consumed);
        }
        if self.focus_trap.handle_key(doc, &key) {
            return Ok(EventOutcome::Consumed);
        }
        Ok(EventOutcome::Ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn shell_with_counter(description: Option<&str>) -> (ModalShell, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let shell = ModalShell::new(
            "신청 폼",
            description.map(str::to_string),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (shell, calls)
    }

    #[test]
    fn test_dialog_accessibility_attributes() {
        let (mut shell, _) = shell_with_counter(Some("설명"));
        let mut doc = Document::new();
        let dialog = shell.open(&mut doc);

        assert_eq!(doc.attribute(dialog, aria::MODAL), Some("true"));
        assert_eq!(doc.attribute(dialog, aria::LABELLEDBY), Some(TITLE_ID));
        assert_eq!(doc.attribute(dialog, aria::DESCRIBEDBY), Some(DESCRIPTION_ID));
        assert!(doc.find_by_element_id(DESCRIPTION_ID).is_some());
        assert_eq!(doc.active_element(), shell.title_node());
    }

    #[test]
    fn test_no_description_no_describedby() {
        let (mut shell, _) = shell_with_counter(None);
        let mut doc = Document::new();
        let dialog = shell.open(&mut doc);

        assert_eq!(doc.attribute(dialog, aria::DESCRIBEDBY), None);
        assert!(doc.find_by_element_id(DESCRIPTION_ID).is_none());
    }

    #[test]
    fn test_escape_only_while_open() {
        let (mut shell, calls) = shell_with_counter(None);
        let mut doc = Document::new();
        let esc = KeyEvent::from(KeyCode::Esc);

        shell.open(&mut doc);
        let outcome = shell.handle_key_event(esc, &mut doc).expect("key");
        assert_eq!(outcome, EventOutcome::Consumed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        shell.close(&mut doc);
        assert!(!shell.escape_installed());
        let outcome = shell.handle_key_event(esc, &mut doc).expect("key");
        assert_eq!(outcome, EventOutcome::Ignored);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_cycles_leave_nothing_behind() {
        let (mut shell, _) = shell_with_counter(Some("설명"));
        let mut doc = Document::new();
        let main = doc.append(doc.body(), Node::new(Role::Main));
        let opener = doc.append(main, Node::new(Role::Button));
        doc.focus(opener);

        for _ in 0..3 {
            shell.open(&mut doc);
            assert!(doc.is_scroll_locked());
            shell.close(&mut doc);
        }

        assert!(!shell.escape_installed());
        assert!(doc.find_by_role(Role::Dialog).is_none());
        assert_eq!(doc.attribute(main, aria::HIDDEN), None);
        assert!(!doc.is_scroll_locked());
        assert_eq!(doc.active_element(), Some(opener));
        assert_eq!(doc.children(doc.body()), &[main]);
    }

    #[test]
    fn test_backdrop_click_closes() {
        let (mut shell, calls) = shell_with_counter(None);
        let mut doc = Document::new();
        shell.open(&mut doc);
        shell.dialog_area = Some(Rect::new(10, 5, 20, 10));

        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        assert!(!shell.handle_mouse_event(&click(15, 8)));
        assert!(shell.handle_mouse_event(&click(0, 0)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
