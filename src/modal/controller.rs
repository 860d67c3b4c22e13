//! Keeps the dialog in step with the request bridge
//!
//! The controller subscribes to the bridge and, on the next [`sync`], opens
//! a fresh shell and form when a request appears or closes them when the
//! request is settled. The shell and form only talk back through callbacks
//! that call [`RequestBridge::resolve`].
//!
//! [`sync`]: ModalController::sync

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};
use tracing::{debug, info};

use crate::{
    config::ModalConfig,
    error::{AppError, AppResult},
    ui::{
        components::{modals::CloseFn, Component, FormCallbacks, FormWidget, ModalShell},
        document::Document,
        keyboard::is_press,
        theme::Theme,
    },
};

use super::bridge::{RequestBridge, RequestId, Subscription};

pub struct ModalController {
    bridge: RequestBridge,
    config: ModalConfig,
    width_percent: u16,
    height_percent: u16,
    shell: Option<ModalShell>,
    form: Option<FormWidget>,
    active_request: Option<RequestId>,
    dirty: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl std::fmt::Debug for ModalController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalController")
            .field("active_request", &self.active_request)
            .field("is_open", &self.is_open())
            .finish()
    }
}

impl ModalController {
    pub fn new(bridge: RequestBridge, config: &ModalConfig) -> Self {
        // Start dirty so a request issued before construction is picked up
        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        let subscription = bridge.subscribe(move || flag.store(true, Ordering::SeqCst));

        Self {
            bridge,
            config: config.clone(),
            width_percent: 60,
            height_percent: 80,
            shell: None,
            form: None,
            active_request: None,
            dirty,
            _subscription: subscription,
        }
    }

    pub fn with_size(mut self, width_percent: u16, height_percent: u16) -> Self {
        self.width_percent = width_percent;
        self.height_percent = height_percent;
        self
    }

    /// Whether the dialog is currently mounted
    pub fn is_open(&self) -> bool {
        self.shell.is_some()
    }

    pub fn bridge(&self) -> &RequestBridge {
        &self.bridge
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active_request
    }

    pub fn shell(&self) -> Option<&ModalShell> {
        self.shell.as_ref()
    }

    pub fn form(&self) -> Option<&FormWidget> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormWidget> {
        self.form.as_mut()
    }

    /// Reconcile the mounted dialog with the bridge's current request
    ///
    /// Returns true when the dialog was opened, closed or replaced.
    pub fn sync(&mut self, doc: &mut Document) -> bool {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return false;
        }

        let current = self.bridge.current_request();
        if current == self.active_request {
            return false;
        }

        self.close_view(doc);
        if let Some(id) = current {
            self.open_view(doc, id);
        }
        self.active_request = current;
        true
    }

    fn open_view(&mut self, doc: &mut Document, id: RequestId) {
        let bridge = self.bridge.clone();
        let on_close: CloseFn = Arc::new(move || {
            bridge.resolve(None);
        });
        let mut shell = ModalShell::new(
            self.config.title.clone(),
            self.config.description.clone(),
            on_close,
        )
        .with_backdrop_close(self.config.close_on_backdrop_click)
        .with_size(self.width_percent, self.height_percent);

        let submit_bridge = self.bridge.clone();
        let cancel_bridge = self.bridge.clone();
        let callbacks = FormCallbacks {
            on_submit: Box::new(move |result| {
                if submit_bridge.resolve(Some(result)) {
                    Ok(())
                } else {
                    Err(AppError::state("submitted form has no pending request"))
                }
            }),
            on_cancel: Box::new(move || {
                cancel_bridge.resolve(None);
            }),
        };
        let mut form = FormWidget::new(callbacks, self.config.submit_delay());

        let dialog = shell.open(doc);
        form.mount(doc, dialog);

        self.shell = Some(shell);
        self.form = Some(form);
        info!("Modal opened for request {}", id);
    }

    fn close_view(&mut self, doc: &mut Document) {
        if let Some(mut form) = self.form.take() {
            form.unmount(doc);
        }
        if let Some(mut shell) = self.shell.take() {
            shell.close(doc);
            if let Some(id) = self.active_request {
                info!("Modal closed for request {}", id);
            }
        }
    }

    /// Route a key to the dialog; every key is swallowed while it is open
    pub fn handle_key_event(&mut self, doc: &mut Document, key: KeyEvent) -> AppResult<bool> {
        self.sync(doc);
        let (Some(shell), Some(form)) = (self.shell.as_mut(), self.form.as_mut()) else {
            return Ok(false);
        };
        if !is_press(&key) {
            return Ok(true);
        }

        let outcome = shell.handle_key_event(key, doc)?;
        if !outcome.is_consumed() {
            let outcome = form.handle_key_event(key, doc)?;
            if !outcome.is_consumed() {
                debug!("Key {:?} ignored by the dialog", key.code);
            }
        }

        // Submissions with no delay complete on the same key press
        self.tick(doc, Instant::now())?;
        Ok(true)
    }

    /// Route a mouse event to the dialog; returns true while it is open
    pub fn handle_mouse_event(&mut self, doc: &mut Document, mouse: &MouseEvent) -> bool {
        self.sync(doc);
        let Some(shell) = self.shell.as_mut() else {
            return false;
        };
        shell.handle_mouse_event(mouse);
        self.sync(doc);
        true
    }

    /// Drive time-based work: a submission waiting for its deadline
    pub fn tick(&mut self, doc: &mut Document, now: Instant) -> AppResult<bool> {
        let outcome = match self.form.as_mut() {
            Some(form) => form.tick(doc, now),
            None => Ok(false),
        };
        self.sync(doc);
        outcome
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, doc: &Document, theme: &Theme) {
        let Some(shell) = self.shell.as_mut() else {
            return;
        };
        shell.render(frame, area, doc, theme);
        if let (Some(form), Some(content)) = (self.form.as_mut(), shell.content_area()) {
            form.render(frame, content, doc, theme);
        }
    }
}
