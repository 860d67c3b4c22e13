//! Modal request plumbing
//!
//! - [`bridge`]: the pending-request slot callers await on
//! - [`focus_trap`] and [`escape`]: keyboard behaviour of an open dialog
//! - [`controller`]: mounts and unmounts the dialog as requests come and go

pub mod bridge;
pub mod controller;
pub mod escape;
pub mod focus_trap;

pub use bridge::{PendingResponse, RequestBridge, RequestId, Subscription};
pub use controller::ModalController;
pub use escape::EscapeHandler;
pub use focus_trap::FocusTrap;
