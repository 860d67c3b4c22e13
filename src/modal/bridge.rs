//! Request/response bridge between callers and the modal
//!
//! A caller asks for form input with [`RequestBridge::request`] and awaits
//! the returned [`PendingResponse`]. The UI settles the request with
//! [`RequestBridge::resolve`] when the user submits or cancels. There is at
//! most one current request; what happens to a second one depends on the
//! configured [`ReentryPolicy`].
//!
//! Observers register with [`RequestBridge::subscribe`] and are called
//! synchronously after every open/closed transition, outside the state lock.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::{ModalConfig, ReentryPolicy},
    error::{AppError, AppResult},
    form::FormResult,
};

/// Identifies one request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Resolver = oneshot::Sender<Option<FormResult>>;
type Listener = Arc<dyn Fn() + Send + Sync>;

struct PendingRequest {
    id: RequestId,
    resolver: Resolver,
    opened_at: DateTime<Utc>,
}

impl PendingRequest {
    fn new() -> (Self, oneshot::Receiver<Option<FormResult>>) {
        let (resolver, receiver) = oneshot::channel();
        let request = Self {
            id: RequestId::new(),
            resolver,
            opened_at: Utc::now(),
        };
        (request, receiver)
    }

    fn settle(self, result: Option<FormResult>) {
        let outcome = if result.is_some() { "submitted" } else { "cancelled" };
        let open_for = Utc::now() - self.opened_at;
        if self.resolver.send(result).is_err() {
            debug!("Request {} {} but its caller stopped waiting", self.id, outcome);
        } else {
            debug!(
                "Request {} {} after {}ms",
                self.id,
                outcome,
                open_for.num_milliseconds()
            );
        }
    }
}

#[derive(Default)]
struct BridgeState {
    current: Option<PendingRequest>,
    queue: VecDeque<PendingRequest>,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Shared handle to the pending-request slot
///
/// Cloning is cheap; every clone observes and mutates the same slot.
#[derive(Clone)]
pub struct RequestBridge {
    state: Arc<Mutex<BridgeState>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    policy: ReentryPolicy,
    timeout: Option<Duration>,
}

impl Default for RequestBridge {
    fn default() -> Self {
        Self::new(ReentryPolicy::default(), None)
    }
}

impl fmt::Debug for RequestBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBridge")
            .field("is_open", &self.is_open())
            .field("queued", &self.queued())
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RequestBridge {
    pub fn new(policy: ReentryPolicy, timeout: Option<Duration>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BridgeState::default())),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            policy,
            timeout,
        }
    }

    pub fn from_config(config: &ModalConfig) -> Self {
        Self::new(config.reentry_policy, config.request_timeout())
    }

    /// Open the modal and return a future for the user's answer
    ///
    /// Fails with [`AppError::Misuse`] under [`ReentryPolicy::Reject`] when a
    /// request is already pending.
    pub fn request(&self) -> AppResult<PendingResponse> {
        let (request, receiver) = PendingRequest::new();
        let id = request.id;

        let notify = {
            let mut state = self.state.lock();
            match (state.current.is_some(), self.policy) {
                (false, _) => {
                    state.current = Some(request);
                    true
                }
                (true, ReentryPolicy::Reject) => {
                    warn!("Rejected form request: another request is pending");
                    return Err(AppError::misuse("a form request is already pending"));
                }
                (true, ReentryPolicy::Queue) => {
                    state.queue.push_back(request);
                    debug!("Queued request {} ({} waiting)", id, state.queue.len());
                    false
                }
                (true, ReentryPolicy::Supersede) => {
                    if let Some(previous) = state.current.replace(request) {
                        info!("Request {} superseded by {}", previous.id, id);
                        previous.settle(None);
                    }
                    true
                }
            }
        };

        info!("Form request {} issued", id);
        if notify {
            self.notify();
        }

        Ok(PendingResponse {
            id,
            receiver,
            bridge: self.clone(),
            timeout: self.timeout,
        })
    }

    /// Settle the current request with `result`
    ///
    /// Returns `false` (and changes nothing) when no request is pending.
    pub fn resolve(&self, result: Option<FormResult>) -> bool {
        let settled = {
            let mut state = self.state.lock();
            match state.current.take() {
                Some(request) => {
                    state.current = state.queue.pop_front();
                    Some(request)
                }
                None => None,
            }
        };

        match settled {
            Some(request) => {
                info!("Form request {} resolved", request.id);
                request.settle(result);
                self.notify();
                true
            }
            None => {
                warn!("resolve called with no pending form request");
                false
            }
        }
    }

    /// Settle `id` with `None` if it is still waiting (timeout path)
    fn expire(&self, id: RequestId) -> bool {
        let (expired, was_current) = {
            let mut state = self.state.lock();
            if state.current.as_ref().map(|r| r.id) == Some(id) {
                let expired = state.current.take();
                state.current = state.queue.pop_front();
                (expired, true)
            } else if let Some(index) = state.queue.iter().position(|r| r.id == id) {
                (state.queue.remove(index), false)
            } else {
                (None, false)
            }
        };

        match expired {
            Some(request) => {
                info!("Form request {} timed out", request.id);
                request.settle(None);
                if was_current {
                    self.notify();
                }
                true
            }
            None => false,
        }
    }

    /// Whether a request is pending (the modal should be shown)
    pub fn is_open(&self) -> bool {
        self.state.lock().current.is_some()
    }

    /// Id of the request the modal is currently answering
    pub fn current_request(&self) -> Option<RequestId> {
        self.state.lock().current.as_ref().map(|r| r.id)
    }

    /// Requests waiting behind the current one
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn policy(&self) -> ReentryPolicy {
        self.policy
    }

    /// Register an observer of open/closed transitions
    ///
    /// The observer stays registered until the returned guard is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = self.listeners.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        debug!("Listener {} subscribed ({} total)", id, registry.listeners.len());

        Subscription {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().listeners.len()
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener();
        }
    }
}

/// Keeps a bridge listener registered; unsubscribes on drop
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|(id, _)| *id != self.id);
            debug!("Listener {} unsubscribed", self.id);
        }
    }
}

/// The caller's side of a request
pub struct PendingResponse {
    id: RequestId,
    receiver: oneshot::Receiver<Option<FormResult>>,
    bridge: RequestBridge,
    timeout: Option<Duration>,
}

impl fmt::Debug for PendingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResponse")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PendingResponse {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Wait for the user's answer
    ///
    /// `Some` carries a validated submission; `None` means the modal was
    /// cancelled, superseded, timed out, or its bridge went away.
    pub async fn wait(mut self) -> Option<FormResult> {
        match self.timeout {
            None => self.receiver.await.ok().flatten(),
            Some(limit) => {
                match tokio::time::timeout(limit, &mut self.receiver).await {
                    Ok(result) => result.ok().flatten(),
                    Err(_) => {
                        self.bridge.expire(self.id);
                        // A result sent just before expiry still wins
                        self.receiver.try_recv().ok().flatten()
                    }
                }
            }
        }
    }
}
