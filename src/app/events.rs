//! Application event system
//!
//! Callers awaiting a form run as background tasks and report back to the
//! UI loop over an unbounded tokio channel.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::{form::FormResult, modal::RequestId};

/// Event handler for async operations
pub struct EventHandler {
    /// Sender for application events
    event_sender: mpsc::UnboundedSender<AppEvent>,
    /// Receiver for application events
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
        }
    }

    /// Try to receive an event (non-blocking)
    pub fn try_receive_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Wait for the next event
    pub async fn receive_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }

    /// Get a cloned sender for background tasks
    pub fn get_sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_sender.clone()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Application events for async communication
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// An awaited form request settled
    FormResolved {
        request_id: RequestId,
        result: Option<FormResult>,
        resolved_at: DateTime<Utc>,
    },
}
