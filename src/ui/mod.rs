//! User Interface module
//!
//! Terminal rendering with ratatui. The page and the dialog both read the
//! shared [`document::Document`] for focus and accessibility state.

pub mod components;
pub mod document;
pub mod keyboard;
pub mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::Span,
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, warn};

use crate::{
    app::state::AppState,
    config::UIConfig,
    error::ErrorSeverity,
    modal::ModalController,
};
use components::Page;
use document::Document;
use theme::Theme;

/// Main UI renderer
pub struct UI {
    /// Current theme
    theme: Theme,
    /// UI configuration
    config: UIConfig,
    /// Last known terminal size
    terminal_size: (u16, u16),
}

impl UI {
    /// Create a new UI instance
    ///
    /// An unknown theme name falls back to the default palette.
    pub fn new(config: &UIConfig) -> Self {
        debug!("Initializing UI with theme: {}", config.theme);

        let theme = Theme::load(&config.theme).unwrap_or_else(|e| {
            warn!("{}, using default theme", e);
            Theme::default_theme()
        });

        Self {
            theme,
            config: config.clone(),
            terminal_size: (80, 24),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn config(&self) -> &UIConfig {
        &self.config
    }

    /// Render the page, the status line and, on top, the dialog
    pub fn render(
        &mut self,
        frame: &mut Frame,
        doc: &Document,
        page: &mut Page,
        controller: &mut ModalController,
        state: &AppState,
    ) {
        let size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Page
                Constraint::Length(1), // Status line
            ])
            .split(size);

        page.render(frame, chunks[0], doc, &self.theme);
        self.render_status_line(frame, chunks[1], state);

        controller.render(frame, size, doc, &self.theme);
    }

    fn render_status_line(&self, frame: &mut Frame, area: ratatui::layout::Rect, state: &AppState) {
        let span = if let Some(error) = state.latest_error() {
            let style = match error.severity {
                ErrorSeverity::Low => self.theme.warning_style(),
                ErrorSeverity::Medium | ErrorSeverity::High => self.theme.error_style(),
            };
            Span::styled(error.message.clone(), style)
        } else if let Some(outcome) = &state.last_outcome {
            let text = if outcome.submitted {
                format!("제출 완료 ({})", outcome.resolved_at.format("%H:%M:%S"))
            } else {
                format!("취소됨 ({})", outcome.resolved_at.format("%H:%M:%S"))
            };
            Span::styled(text, self.theme.muted_style())
        } else {
            Span::styled("", self.theme.muted_style())
        };
        frame.render_widget(Paragraph::new(span), area);
    }

    /// Handle terminal resize
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        debug!("UI resized to {}x{}", width, height);
        self.terminal_size = (width, height);
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}
