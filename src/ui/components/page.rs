//! Host page behind the dialog
//!
//! A header, the button that opens the form, and a panel with the most
//! recent submission.

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    form::FormResult,
    ui::{
        document::{aria, Document, Node, NodeId, Role},
        keyboard::{is_press, ActionKey, FocusKey, ShortcutManager},
        theme::Theme,
    },
};

use super::modals::contains;

pub const OPEN_BUTTON_ID: &str = "open-modal";
pub const OPEN_BUTTON_TEXT: &str = "신청 폼 열기";
pub const RESULT_TITLE: &str = "제출된 데이터:";
pub const EMPTY_GITHUB: &str = "미입력";

/// What the page wants the application to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    None,
    OpenForm,
    Quit,
}

#[derive(Debug, Clone, Copy)]
struct PageNodes {
    main: NodeId,
    open_button: NodeId,
    result_panel: NodeId,
}

#[derive(Debug, Default)]
pub struct Page {
    title: String,
    nodes: Option<PageNodes>,
    submitted: Option<FormResult>,
    button_area: Option<Rect>,
    shortcuts: ShortcutManager,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Build the page's nodes and focus the open button
    pub fn mount(&mut self, doc: &mut Document) -> NodeId {
        if let Some(nodes) = self.nodes {
            return nodes.main;
        }

        let main = doc.append(doc.body(), Node::new(Role::Main));
        doc.append(
            main,
            Node::new(Role::Heading).with_text(self.title.clone()),
        );
        let open_button = doc.append(
            main,
            Node::new(Role::Button)
                .with_id(OPEN_BUTTON_ID)
                .with_text(OPEN_BUTTON_TEXT),
        );
        let result_panel = doc.append(
            main,
            Node::new(Role::Group).with_attribute(aria::LABEL, RESULT_TITLE),
        );
        doc.focus(open_button);

        self.nodes = Some(PageNodes {
            main,
            open_button,
            result_panel,
        });
        main
    }

    pub fn main(&self) -> Option<NodeId> {
        self.nodes.map(|n| n.main)
    }

    pub fn open_button(&self) -> Option<NodeId> {
        self.nodes.map(|n| n.open_button)
    }

    pub fn submitted(&self) -> Option<&FormResult> {
        self.submitted.as_ref()
    }

    /// Show a submission in the result panel
    pub fn show_submission(&mut self, doc: &mut Document, result: FormResult) {
        if let Some(nodes) = self.nodes {
            let summary = Self::summary_lines(&result).join("\n");
            doc.set_text(nodes.result_panel, summary);
        }
        self.submitted = Some(result);
    }

    fn summary_lines(result: &FormResult) -> Vec<String> {
        let github = if result.github().is_empty() {
            EMPTY_GITHUB
        } else {
            result.github()
        };
        vec![
            format!("이름/닉네임: {}", result.name()),
            format!("이메일: {}", result.email()),
            format!("FE 경력 연차: {}", result.experience()),
            format!("GitHub 링크: {}", github),
        ]
    }

    /// Page-level keys; only used while no dialog is open
    pub fn handle_key(&self, key: &KeyEvent, doc: &mut Document) -> PageAction {
        if !is_press(key) {
            return PageAction::None;
        }
        let Some(nodes) = self.nodes else {
            return PageAction::None;
        };

        if ActionKey::Quit.matches(key) {
            return PageAction::Quit;
        }
        if FocusKey::from_event(key).is_some() {
            doc.focus(nodes.open_button);
            return PageAction::None;
        }
        let activates = ActionKey::Confirm.matches(key) || ActionKey::Activate.matches(key);
        if activates && doc.is_focused(nodes.open_button) {
            return PageAction::OpenForm;
        }
        PageAction::None
    }

    /// A left click on the open button opens the form
    pub fn handle_mouse(&self, mouse: &MouseEvent, doc: &mut Document) -> PageAction {
        let (Some(nodes), Some(area)) = (self.nodes, self.button_area) else {
            return PageAction::None;
        };
        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && contains(area, mouse.column, mouse.row)
        {
            doc.focus(nodes.open_button);
            return PageAction::OpenForm;
        }
        PageAction::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, doc: &Document, theme: &Theme) {
        let Some(nodes) = self.nodes else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Open button
                Constraint::Min(0),    // Submitted data
                Constraint::Length(1), // Help
            ])
            .split(area);

        let header = Paragraph::new(Span::styled(self.title.as_str(), theme.title_style()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM).border_style(theme.border_style()));
        frame.render_widget(header, chunks[0]);

        let button_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(20),
                Constraint::Min(0),
            ])
            .split(chunks[1]);
        let focused = doc.is_focused(nodes.open_button);
        let (text_style, border_style) = if focused {
            (theme.highlight_style(), theme.focus_border_style())
        } else {
            (theme.text_style(), theme.border_style())
        };
        let button = Paragraph::new(Span::styled(OPEN_BUTTON_TEXT, text_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(button, button_row[1]);
        self.button_area = Some(button_row[1]);

        if let Some(result) = &self.submitted {
            let lines: Vec<Line> = Self::summary_lines(result)
                .into_iter()
                .map(|line| Line::from(Span::styled(line, theme.text_style())))
                .collect();
            let panel = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(Span::styled(RESULT_TITLE, theme.success_style())),
            );
            frame.render_widget(panel, chunks[2]);
        }

        let help = Paragraph::new(self.shortcuts.page_help())
            .style(theme.muted_style())
            .alignment(Alignment::Center);
        frame.render_widget(help, chunks[3]);
    }
}
