//! Headless demo session
//!
//! Drives the same [`App`] the terminal uses with a scripted sequence of key
//! presses: an empty submit that fails validation, then a filled-in form
//! that goes through. Results are logged as JSON.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    form::FormResult,
};

use super::{events::AppEvent, App};

const EVENT_WAIT: Duration = Duration::from_secs(5);

fn press(app: &mut App, code: KeyCode) -> AppResult<()> {
    app.handle_key(KeyEvent::from(code))
}

fn type_text(app: &mut App, text: &str) -> AppResult<()> {
    for c in text.chars() {
        press(app, KeyCode::Char(c))?;
    }
    Ok(())
}

/// Run the scripted session and return what the awaiting caller received
pub async fn run_demo(config: Config) -> AppResult<Option<FormResult>> {
    let submit_delay = config.modal.submit_delay();
    let mut app = App::with_config(config);

    let request_id = app.open_form()?;
    info!("Demo opened form for request {}", request_id);

    // Submitting straight away fails validation and focuses the name field
    press(&mut app, KeyCode::Enter)?;
    if let Some(form) = app.controller().form() {
        let errors = serde_json::to_string(form.errors())?;
        info!("Validation errors: {}", errors);
    }

    type_text(&mut app, "Kim")?;
    press(&mut app, KeyCode::Tab)?;
    type_text(&mut app, "kim@example.com")?;
    press(&mut app, KeyCode::Tab)?;
    press(&mut app, KeyCode::Right)?;
    press(&mut app, KeyCode::Tab)?;
    type_text(&mut app, "https://github.com/kim")?;
    press(&mut app, KeyCode::Enter)?;

    tokio::time::sleep(submit_delay).await;
    app.tick(Instant::now());

    match app.next_event(EVENT_WAIT).await {
        Some(AppEvent::FormResolved { result, .. }) => {
            match &result {
                Some(submitted) => {
                    info!("Submitted: {}", serde_json::to_string_pretty(submitted)?);
                }
                None => warn!("Form closed without a submission"),
            }
            Ok(result)
        }
        Some(other) => Err(AppError::state(format!("unexpected event {:?}", other))),
        None => Err(AppError::state("form request never resolved")),
    }
}
