//! Modal Form - accessible modal dialog and form for the terminal
//!
//! A caller asks for input with [`modal::RequestBridge::request`] and awaits
//! the answer. While the request is pending the dialog is shown: focus is
//! trapped inside it, the page behind is hidden from assistive tech, and
//! Escape cancels. A valid submission resolves the request with a
//! [`form::FormResult`]; any cancellation resolves it with `None`.
//!
//! # Architecture
//!
//! - **form**: field data, validation and the validated result type
//! - **modal**: request bridge, focus trap, escape handling, controller
//! - **ui**: accessibility tree, ratatui components, theme, key mapping
//! - **app**: terminal host page, event loop and headless demo

pub mod app;
pub mod config;
pub mod error;
pub mod form;
pub mod modal;
pub mod ui;

pub use app::App;
pub use error::{AppError, AppResult};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// Log levels come from `RUST_LOG`; output goes to stderr so it never
/// draws over the TUI on stdout.
pub fn initialize_logging() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modal_form=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
