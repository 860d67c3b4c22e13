//! Application state management
//!
//! Lifecycle, the outcome of the last form request, and error
//! notifications shown in the status line.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, ErrorSeverity},
    form::FormResult,
    modal::RequestId,
};

/// Notifications kept before the oldest are dropped
pub const MAX_ERROR_NOTIFICATIONS: usize = 16;

/// Central application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application lifecycle state
    pub app_state: AppLifecycleState,

    /// Outcome of the most recent form request
    pub last_outcome: Option<RequestOutcome>,

    /// Error and notification state
    pub notification_state: NotificationState,
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            app_state: AppLifecycleState::default(),
            last_outcome: None,
            notification_state: NotificationState::default(),
        }
    }

    /// Check if the application should quit
    pub fn should_quit(&self) -> bool {
        matches!(self.app_state.lifecycle, LifecyclePhase::Quitting)
    }

    /// Set the quit flag
    pub fn set_should_quit(&mut self, should_quit: bool) {
        if should_quit {
            self.app_state.lifecycle = LifecyclePhase::Quitting;
            self.app_state.quit_requested_at = Some(Utc::now());
        }
    }

    pub fn set_running(&mut self) {
        self.app_state.lifecycle = LifecyclePhase::Running;
    }

    /// Record how a form request ended
    pub fn record_outcome(
        &mut self,
        request_id: RequestId,
        result: Option<FormResult>,
        resolved_at: DateTime<Utc>,
    ) {
        self.last_outcome = Some(RequestOutcome {
            request_id,
            submitted: result.is_some(),
            resolved_at,
        });
    }

    /// Add an error to the notification system
    pub fn add_error(&mut self, error: &AppError) {
        let errors = &mut self.notification_state.errors;
        if errors.len() == MAX_ERROR_NOTIFICATIONS {
            errors.remove(0);
        }
        errors.push(ErrorNotification {
            id: Uuid::new_v4(),
            message: error.to_string(),
            severity: error.severity(),
            timestamp: Utc::now(),
        });
    }

    /// Most recent error the user has not dismissed
    pub fn latest_error(&self) -> Option<&ErrorNotification> {
        self.notification_state.errors.last()
    }

    /// Dismiss every pending notification
    pub fn acknowledge_errors(&mut self) {
        self.notification_state.errors.clear();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Application lifecycle state
#[derive(Debug, Clone)]
pub struct AppLifecycleState {
    pub lifecycle: LifecyclePhase,
    pub started_at: DateTime<Utc>,
    pub quit_requested_at: Option<DateTime<Utc>>,
}

impl Default for AppLifecycleState {
    fn default() -> Self {
        Self {
            lifecycle: LifecyclePhase::Starting,
            started_at: Utc::now(),
            quit_requested_at: None,
        }
    }
}

/// Application lifecycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Starting,
    Running,
    Quitting,
}

/// How the last form request ended
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub request_id: RequestId,
    pub submitted: bool,
    pub resolved_at: DateTime<Utc>,
}

/// Error and notification state
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    pub errors: Vec<ErrorNotification>,
}

/// Error notification
#[derive(Debug, Clone)]
pub struct ErrorNotification {
    pub id: Uuid,
    pub message: String,
    pub severity: ErrorSeverity,
    pub timestamp: DateTime<Utc>,
}
