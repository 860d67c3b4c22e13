//! Application form shown inside the dialog
//!
//! Mirrors its fields, buttons and inline alerts into the [`Document`] so
//! the focus trap and assistive semantics see them, validates on submit, and
//! reports the outcome through [`FormCallbacks`].

use std::{collections::BTreeMap, time::Duration, time::Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, warn};

use crate::{
    error::AppResult,
    form::{FieldErrors, FieldKey, FieldKind, FormResult, FormState, EXPERIENCE_OPTIONS},
    ui::{
        components::{Component, EventOutcome},
        document::{aria, Document, Node, NodeId, Role},
        keyboard::{is_press, ActionKey, ShortcutManager},
        theme::Theme,
    },
};

pub const FORM_LABEL: &str = "문의 폼";
pub const ACTIONS_LABEL: &str = "폼 액션 버튼";
pub const CANCEL_ID: &str = "cancel";
pub const CANCEL_TEXT: &str = "취소";
pub const CANCEL_LABEL: &str = "모달 닫기";
pub const SUBMIT_ID: &str = "submit";
pub const SUBMIT_TEXT: &str = "제출하기";
pub const SUBMIT_LABEL: &str = "폼 제출";
pub const SUBMITTING_TEXT: &str = "제출 중...";
pub const SUBMITTING_LABEL: &str = "제출 중입니다";

pub type SubmitFn = Box<dyn FnMut(FormResult) -> AppResult<()> + Send>;
pub type CancelFn = Box<dyn FnMut() + Send>;

/// Outcome hooks supplied by the owner of the form
pub struct FormCallbacks {
    pub on_submit: SubmitFn,
    pub on_cancel: CancelFn,
}

/// Focusable parts of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormControl {
    Field(FieldKey),
    Cancel,
    Submit,
}

#[derive(Debug, Clone, Copy)]
struct FieldNodes {
    wrapper: NodeId,
    control: NodeId,
    alert: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct FormNodes {
    form: NodeId,
    fields: BTreeMap<FieldKey, FieldNodes>,
    cancel: NodeId,
    submit: NodeId,
}

#[derive(Debug)]
struct PendingSubmit {
    result: FormResult,
    deadline: Instant,
}

pub struct FormWidget {
    state: FormState,
    callbacks: FormCallbacks,
    submit_delay: Duration,
    nodes: Option<FormNodes>,
    pending: Option<PendingSubmit>,
    shortcuts: ShortcutManager,
}

impl FormWidget {
    pub fn new(callbacks: FormCallbacks, submit_delay: Duration) -> Self {
        Self {
            state: FormState::default(),
            callbacks,
            submit_delay,
            nodes: None,
            pending: None,
            shortcuts: ShortcutManager::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.nodes.is_some()
    }

    /// Control node of a field while mounted
    pub fn control(&self, key: FieldKey) -> Option<NodeId> {
        self.nodes
            .as_ref()
            .and_then(|n| n.fields.get(&key))
            .map(|f| f.control)
    }

    pub fn cancel_button(&self) -> Option<NodeId> {
        self.nodes.as_ref().map(|n| n.cancel)
    }

    pub fn submit_button(&self) -> Option<NodeId> {
        self.nodes.as_ref().map(|n| n.submit)
    }

    /// Build the form's nodes under `parent` and return the form node
    pub fn mount(&mut self, doc: &mut Document, parent: NodeId) -> NodeId {
        if let Some(nodes) = &self.nodes {
            return nodes.form;
        }

        let form = doc.append(
            parent,
            Node::new(Role::Form).with_attribute(aria::LABEL, FORM_LABEL),
        );

        let mut fields = BTreeMap::new();
        for key in FieldKey::ALL {
            let wrapper = doc.append(form, Node::new(Role::Group));
            let role = match key.kind() {
                FieldKind::Select => Role::Select,
                _ => Role::TextInput,
            };
            let mut control = Node::new(role)
                .with_id(key.element_id())
                .with_attribute(aria::LABEL, key.display_label())
                .with_text(self.state.data.get(key));
            if key.is_required() {
                control = control.with_attribute(aria::REQUIRED, "true");
            }
            let control = doc.append(wrapper, control);
            fields.insert(
                key,
                FieldNodes {
                    wrapper,
                    control,
                    alert: None,
                },
            );
        }

        let actions = doc.append(
            form,
            Node::new(Role::Group).with_attribute(aria::LABEL, ACTIONS_LABEL),
        );
        let cancel = doc.append(
            actions,
            Node::new(Role::Button)
                .with_id(CANCEL_ID)
                .with_text(CANCEL_TEXT)
                .with_attribute(aria::LABEL, CANCEL_LABEL),
        );
        let submit = doc.append(
            actions,
            Node::new(Role::Button)
                .with_id(SUBMIT_ID)
                .with_text(SUBMIT_TEXT)
                .with_attribute(aria::LABEL, SUBMIT_LABEL),
        );

        self.nodes = Some(FormNodes {
            form,
            fields,
            cancel,
            submit,
        });
        self.sync_errors(doc);
        form
    }

    /// Remove the form's nodes; an unfinished submission is dropped
    pub fn unmount(&mut self, doc: &mut Document) {
        if let Some(nodes) = self.nodes.take() {
            doc.remove(nodes.form);
        }
        if self.pending.take().is_some() {
            debug!("Form unmounted with a submission in flight");
        }
    }

    /// Update one field's value; clears that field's error
    pub fn set_value(&mut self, doc: &mut Document, key: FieldKey, value: impl Into<String>) {
        let value = value.into();
        self.state = std::mem::take(&mut self.state).apply(key, value.clone());
        if let Some(control) = self.control(key) {
            doc.set_text(control, value);
        }
        self.sync_errors(doc);
    }

    /// Which form control currently holds focus
    pub fn focused_control(&self, doc: &Document) -> Option<FormControl> {
        let nodes = self.nodes.as_ref()?;
        let active = doc.active_element()?;
        if active == nodes.cancel {
            return Some(FormControl::Cancel);
        }
        if active == nodes.submit {
            return Some(FormControl::Submit);
        }
        nodes
            .fields
            .iter()
            .find(|(_, f)| f.control == active)
            .map(|(key, _)| FormControl::Field(*key))
    }

    /// Validate and start a submission
    ///
    /// Returns true when the data validated and the submission is now
    /// waiting for its deadline; see [`FormWidget::tick`].
    pub fn request_submit(&mut self, doc: &mut Document, now: Instant) -> bool {
        if self.pending.is_some() {
            debug!("Submit ignored, a submission is already in flight");
            return false;
        }

        match FormResult::try_from(self.state.data.clone()) {
            Err(errors) => {
                debug!("Form validation failed on {} field(s)", errors.len());
                let first = errors.first();
                self.state.errors = errors;
                self.sync_errors(doc);
                if let Some(control) = first.and_then(|key| self.control(key)) {
                    doc.focus(control);
                }
                false
            }
            Ok(result) => {
                self.state.errors = FieldErrors::default();
                self.sync_errors(doc);
                if let Some(submit) = self.submit_button() {
                    doc.set_disabled(submit, true);
                    doc.set_text(submit, SUBMITTING_TEXT);
                    doc.set_attribute(submit, aria::LABEL, SUBMITTING_LABEL);
                }
                self.pending = Some(PendingSubmit {
                    result,
                    deadline: now + self.submit_delay,
                });
                true
            }
        }
    }

    /// Finish a submission whose deadline has passed
    ///
    /// Returns Ok(true) when the submit callback ran. The submit button is
    /// re-enabled whatever the callback returned.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) -> AppResult<bool> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => {}
            _ => return Ok(false),
        }
        let Some(pending) = self.pending.take() else {
            return Ok(false);
        };

        info!("Submitting form");
        let outcome = (self.callbacks.on_submit)(pending.result);

        if let Some(submit) = self.submit_button() {
            doc.set_disabled(submit, false);
            doc.set_text(submit, SUBMIT_TEXT);
            doc.set_attribute(submit, aria::LABEL, SUBMIT_LABEL);
        }

        if let Err(e) = &outcome {
            warn!("Submit callback failed: {}", e);
        }
        outcome.map(|_| true)
    }

    pub fn cancel(&mut self) {
        debug!("Form cancelled");
        (self.callbacks.on_cancel)();
    }

    fn sync_errors(&mut self, doc: &mut Document) {
        let Some(nodes) = self.nodes.as_mut() else {
            return;
        };

        for (key, field) in nodes.fields.iter_mut() {
            match self.state.errors.get(*key) {
                Some(message) => {
                    doc.set_attribute(field.control, aria::INVALID, "true");
                    doc.set_attribute(field.control, aria::DESCRIBEDBY, key.error_id());
                    match field.alert {
                        Some(alert) => doc.set_text(alert, message),
                        None => {
                            let alert = doc.append(
                                field.wrapper,
                                Node::new(Role::Alert)
                                    .with_id(key.error_id())
                                    .with_text(message),
                            );
                            field.alert = Some(alert);
                        }
                    }
                }
                None => {
                    doc.remove_attribute(field.control, aria::INVALID);
                    doc.remove_attribute(field.control, aria::DESCRIBEDBY);
                    if let Some(alert) = field.alert.take() {
                        doc.remove(alert);
                    }
                }
            }
        }
    }

    fn cycle_option(&mut self, doc: &mut Document, key: FieldKey, step: isize) {
        // Index 0 is the empty placeholder
        let count = EXPERIENCE_OPTIONS.len() as isize + 1;
        let current = EXPERIENCE_OPTIONS
            .iter()
            .position(|o| *o == self.state.data.get(key))
            .map(|i| i as isize + 1)
            .unwrap_or(0);
        let next = (current + step).rem_euclid(count);
        let value = match next {
            0 => "",
            i => EXPERIENCE_OPTIONS[(i - 1) as usize],
        };
        self.set_value(doc, key, value);
    }

    fn edit_field(&mut self, doc: &mut Document, key: FieldKey, event: &KeyEvent) -> bool {
        if key.kind() == FieldKind::Select {
            if let Some(nav) = self.shortcuts.is_navigation_key(event) {
                self.cycle_option(doc, key, nav.step());
                return true;
            }
            if ActionKey::Clear.matches(event) {
                self.set_value(doc, key, "");
                return true;
            }
            return false;
        }

        if ActionKey::Clear.matches(event) {
            self.set_value(doc, key, "");
            return true;
        }
        match event.code {
            KeyCode::Backspace => {
                let mut value = self.state.data.get(key).to_string();
                if value.pop().is_some() {
                    self.set_value(doc, key, value);
                }
                true
            }
            KeyCode::Char(c)
                if !event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let mut value = self.state.data.get(key).to_string();
                value.push(c);
                self.set_value(doc, key, value);
                true
            }
            _ => false,
        }
    }

    fn control_style(&self, doc: &Document, key: FieldKey, theme: &Theme) -> Style {
        match self.control(key) {
            Some(node) if doc.is_focused(node) => theme.focus_border_style(),
            _ if self.state.errors.contains(key) => theme.invalid_border_style(),
            _ => theme.border_style(),
        }
    }

    fn render_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        doc: &Document,
        theme: &Theme,
        key: FieldKey,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1)])
            .split(area);

        let value = self.state.data.get(key);
        let focused = self.control(key).map(|n| doc.is_focused(n)).unwrap_or(false);

        let content = match (key.kind(), value.is_empty(), key.placeholder()) {
            (FieldKind::Select, true, Some(placeholder)) => Line::from(vec![
                Span::styled(format!("◀ {} ▶", placeholder), theme.muted_style()),
            ]),
            (FieldKind::Select, _, _) => Line::from(vec![
                Span::styled(format!("◀ {} ▶", value), theme.text_style()),
            ]),
            (_, true, Some(placeholder)) => {
                Line::from(Span::styled(placeholder, theme.muted_style()))
            }
            _ => Line::from(Span::styled(value, theme.text_style())),
        };

        let input = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.control_style(doc, key, theme))
                .title(key.display_label()),
        );
        frame.render_widget(input, chunks[0]);

        if focused && key.kind() != FieldKind::Select {
            let offset = Span::raw(value).width() as u16;
            let x = chunks[0]
                .x
                .saturating_add(1)
                .saturating_add(offset)
                .min(chunks[0].right().saturating_sub(2));
            frame.set_cursor(x, chunks[0].y.saturating_add(1));
        }

        if let Some(message) = self.state.errors.get(key) {
            let alert = Paragraph::new(message).style(theme.error_style());
            frame.render_widget(alert, chunks[1]);
        }
    }

    fn render_button(
        &self,
        frame: &mut Frame,
        area: Rect,
        doc: &Document,
        theme: &Theme,
        node: NodeId,
    ) {
        let label = doc.node(node).map(|n| n.text()).unwrap_or_default();
        let disabled = doc.node(node).map(|n| n.is_disabled()).unwrap_or(false);
        let (text_style, border_style) = if disabled {
            (theme.muted_style(), theme.border_style())
        } else if doc.is_focused(node) {
            (theme.highlight_style(), theme.focus_border_style())
        } else {
            (theme.text_style(), theme.border_style())
        };
        let button = Paragraph::new(Line::from(Span::styled(label.to_string(), text_style)))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
        frame.render_widget(button, area);
    }
}

impl Component for FormWidget {
    fn render(&mut self, frame: &mut Frame, area: Rect, doc: &Document, theme: &Theme) {
        let Some(nodes) = self.nodes.clone() else {
            return;
        };

        let mut constraints: Vec<Constraint> =
            FieldKey::ALL.iter().map(|_| Constraint::Length(4)).collect();
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Min(0));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (index, key) in FieldKey::ALL.into_iter().enumerate() {
            self.render_field(frame, rows[index], doc, theme, key);
        }

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[FieldKey::ALL.len()]);
        self.render_button(frame, buttons[0], doc, theme, nodes.cancel);
        self.render_button(frame, buttons[1], doc, theme, nodes.submit);
    }

    fn handle_key_event(&mut self, key: KeyEvent, doc: &mut Document) -> AppResult<EventOutcome> {
        if self.nodes.is_none() || !is_press(&key) {
            return Ok(EventOutcome::Ignored);
        }

        let focused = self.focused_control(doc);

        if ActionKey::Confirm.matches(&key) {
            match focused {
                Some(FormControl::Cancel) => self.cancel(),
                _ => {
                    self.request_submit(doc, Instant::now());
                }
            }
            return Ok(EventOutcome::Consumed);
        }

        match focused {
            Some(FormControl::Cancel) if ActionKey::Activate.matches(&key) => {
                self.cancel();
                Ok(EventOutcome::Consumed)
            }
            Some(FormControl::Submit) if ActionKey::Activate.matches(&key) => {
                self.request_submit(doc, Instant::now());
                Ok(EventOutcome::Consumed)
            }
            Some(FormControl::Field(field)) => {
                if self.edit_field(doc, field, &key) {
                    Ok(EventOutcome::Consumed)
                } else {
                    Ok(EventOutcome::Ignored)
                }
            }
            _ => Ok(EventOutcome::Ignored),
        }
    }
}
