//! Application core module
//!
//! Hosts the page, owns the document, and drives the terminal event loop.
//! Opening the form spawns a task that awaits the bridge and reports back
//! over the event channel.

pub mod demo;
pub mod events;
pub mod state;

use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    modal::{ModalController, RequestBridge, RequestId},
    ui::{
        components::{page::PageAction, Page},
        document::Document,
        UI,
    },
};
use events::{AppEvent, EventHandler};
use state::AppState;

/// Main application struct
pub struct App {
    /// Accessibility tree shared by the page and the dialog
    document: Document,
    /// Host page
    page: Page,
    /// Pending-request slot the form answers
    bridge: RequestBridge,
    /// Mounts the dialog while a request is pending
    controller: ModalController,
    /// Application state
    state: AppState,
    /// Event handler for async operations
    event_handler: EventHandler,
    /// UI renderer
    ui: UI,
    /// Application configuration
    config: Config,
    startup_time: Duration,
}

impl App {
    /// Create a new application instance from the layered configuration
    pub async fn new() -> AppResult<Self> {
        let config_start = Instant::now();
        let config = Config::load().await?;
        debug!("Configuration loaded in {:?}", config_start.elapsed());

        Ok(Self::with_config(config))
    }

    /// Create an application without touching the terminal
    pub fn with_config(config: Config) -> Self {
        let init_start = Instant::now();
        info!("Initializing {} {}", config.app.name, config.app.version);

        let mut document = Document::new();
        let mut page = Page::new(config.app.name.clone());
        page.mount(&mut document);

        let bridge = RequestBridge::from_config(&config.modal);
        let controller = ModalController::new(bridge.clone(), &config.modal)
            .with_size(config.ui.modal_width_percent, config.ui.modal_height_percent);

        let ui = UI::new(&config.ui);
        let mut state = AppState::new();
        state.set_running();

        let startup_time = init_start.elapsed();
        debug!("Application initialized in {:?}", startup_time);

        Self {
            document,
            page,
            bridge,
            controller,
            state,
            event_handler: EventHandler::new(),
            ui,
            config,
            startup_time,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn bridge(&self) -> &RequestBridge {
        &self.bridge
    }

    pub fn controller(&self) -> &ModalController {
        &self.controller
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the main application loop
    pub async fn run(mut self) -> AppResult<()> {
        info!("Starting application main loop");

        self.setup_terminal()?;
        let result = self.main_loop().await;
        self.cleanup_terminal()?;

        // Nobody is left to answer an open form
        if self.bridge.is_open() {
            self.bridge.resolve(None);
        }

        result
    }

    /// Setup terminal for TUI
    fn setup_terminal(&self) -> AppResult<()> {
        enable_raw_mode().map_err(|e| {
            warn!("Failed to enable raw mode: {}", e);
            AppError::Io(e)
        })?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            warn!("Failed to setup terminal: {}", e);
            AppError::Io(e)
        })?;
        if self.config.ui.enable_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        Ok(())
    }

    /// Cleanup terminal after TUI
    fn cleanup_terminal(&self) -> AppResult<()> {
        disable_raw_mode()?;
        let mut stdout = std::io::stdout();
        if self.config.ui.enable_mouse {
            execute!(stdout, DisableMouseCapture)?;
        }
        execute!(stdout, LeaveAlternateScreen)?;
        Ok(())
    }

    /// Main application event loop
    async fn main_loop(&mut self) -> AppResult<()> {
        let backend = CrosstermBackend::new(std::io::stdout());
        let mut terminal =
            Terminal::new(backend).map_err(|e| AppError::Terminal(e.to_string()))?;
        let refresh = Duration::from_millis(self.config.ui.refresh_rate_ms);

        info!("Entering main application loop");

        loop {
            terminal
                .draw(|f| {
                    self.ui.render(
                        f,
                        &self.document,
                        &mut self.page,
                        &mut self.controller,
                        &self.state,
                    );
                })
                .map_err(|e| AppError::Terminal(e.to_string()))?;

            let had_event = self.handle_events()?;

            self.tick(Instant::now());
            self.process_background_tasks();

            if self.state.should_quit() {
                info!("Application quit requested");
                break;
            }

            if !had_event {
                sleep(refresh).await;
            }
        }

        Ok(())
    }

    /// Handle input events
    fn handle_events(&mut self) -> AppResult<bool> {
        if !event::poll(Duration::from_millis(0))? {
            return Ok(false);
        }

        match event::read()? {
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => self.handle_mouse(&mouse),
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                self.ui.handle_resize(width, height);
            }
            _ => {}
        }

        Ok(true)
    }

    /// Route a key press to the dialog when open, else to the page
    pub fn handle_key(&mut self, key: KeyEvent) -> AppResult<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            info!("Interrupt received, quitting");
            self.state.set_should_quit(true);
            return Ok(());
        }

        match self.controller.handle_key_event(&mut self.document, key) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                warn!(severity = e.severity().as_str(), "Dialog key handling failed: {}", e);
                self.state.add_error(&e);
                return Ok(());
            }
        }

        self.state.acknowledge_errors();
        match self.page.handle_key(&key, &mut self.document) {
            PageAction::OpenForm => {
                self.open_form_reporting_errors();
            }
            PageAction::Quit => {
                info!("Quit requested by user");
                self.state.set_should_quit(true);
            }
            PageAction::None => {}
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        if self.controller.handle_mouse_event(&mut self.document, mouse) {
            return;
        }
        if self.page.handle_mouse(mouse, &mut self.document) == PageAction::OpenForm {
            self.open_form_reporting_errors();
        }
    }

    fn open_form_reporting_errors(&mut self) {
        if let Err(e) = self.open_form() {
            warn!(severity = e.severity().as_str(), "Could not open form: {}", e);
            self.state.add_error(&e);
        }
    }

    /// Ask the bridge for a form and await the answer on a background task
    ///
    /// The outcome arrives later as [`AppEvent::FormResolved`].
    pub fn open_form(&mut self) -> AppResult<RequestId> {
        let pending = self.bridge.request()?;
        let request_id = pending.id();
        let sender = self.event_handler.get_sender();

        tokio::spawn(async move {
            let result = pending.wait().await;
            let event = AppEvent::FormResolved {
                request_id,
                result,
                resolved_at: Utc::now(),
            };
            if sender.send(event).is_err() {
                debug!("Application gone before request {} resolved", request_id);
            }
        });

        self.controller.sync(&mut self.document);
        Ok(request_id)
    }

    /// Advance deadline-driven work and keep the dialog in sync
    pub fn tick(&mut self, now: Instant) {
        if let Err(e) = self.controller.tick(&mut self.document, now) {
            warn!(severity = e.severity().as_str(), "Form submission failed: {}", e);
            self.state.add_error(&e);
        }
        self.controller.sync(&mut self.document);
    }

    /// Drain events reported by background tasks
    fn process_background_tasks(&mut self) {
        while let Some(event) = self.event_handler.try_receive_event() {
            self.handle_app_event(event);
        }
    }

    /// Wait up to `limit` for the next background event and apply it
    pub async fn next_event(&mut self, limit: Duration) -> Option<AppEvent> {
        let event = tokio::time::timeout(limit, self.event_handler.receive_event())
            .await
            .ok()
            .flatten()?;
        self.handle_app_event(event.clone());
        Some(event)
    }

    /// Handle application events from background tasks
    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FormResolved {
                request_id,
                result,
                resolved_at,
            } => {
                match &result {
                    Some(_) => info!("Request {} answered with a submission", request_id),
                    None => info!("Request {} closed without a submission", request_id),
                }
                if let Some(submitted) = result.clone() {
                    self.page.show_submission(&mut self.document, submitted);
                }
                self.state.record_outcome(request_id, result, resolved_at);
            }
        }
    }

    pub fn startup_time(&self) -> Duration {
        self.startup_time
    }
}
