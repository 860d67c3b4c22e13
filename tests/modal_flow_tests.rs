//! End-to-end dialog flows through the application host
//!
//! Each test drives the same key routing the terminal loop uses, then
//! waits for the background task awaiting the form to report back.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use modal_form::{
    app::{demo::run_demo, events::AppEvent},
    config::{Config, ReentryPolicy},
    form::FieldKey,
    ui::document::{aria, Role},
    App,
};

const WAIT: Duration = Duration::from_secs(2);

fn test_config() -> Config {
    let mut config = Config::default();
    config.modal.submit_delay_ms = 0;
    config
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::from(code)).expect("key handling");
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn main_hidden(app: &App) -> Option<String> {
    let main = app.document().find_by_role(Role::Main).expect("main region");
    app.document().attribute(main, aria::HIDDEN).map(str::to_string)
}

/// Fill every required field, leaving focus on the github input
fn fill_required(app: &mut App, name: &str, email: &str) {
    press(app, KeyCode::Tab);
    type_text(app, name);
    press(app, KeyCode::Tab);
    type_text(app, email);
    press(app, KeyCode::Tab);
    press(app, KeyCode::Right);
    press(app, KeyCode::Tab);
}

async fn resolved_result(app: &mut App) -> Option<Option<modal_form::form::FormResult>> {
    match app.next_event(WAIT).await {
        Some(AppEvent::FormResolved { result, .. }) => Some(result),
        _ => None,
    }
}

#[tokio::test]
async fn test_opening_hides_page_and_focuses_title() {
    let mut app = App::with_config(test_config());
    app.open_form().expect("open form");

    let doc = app.document();
    let dialog = doc.find_by_role(Role::Dialog).expect("dialog node");
    let title = doc.find_by_element_id("modal-title").expect("title node");

    assert!(app.controller().is_open());
    assert_eq!(doc.attribute(dialog, aria::MODAL), Some("true"));
    assert_eq!(doc.attribute(dialog, aria::LABELLEDBY), Some("modal-title"));
    assert_eq!(doc.attribute(dialog, aria::DESCRIBEDBY), Some("modal-description"));
    assert_eq!(doc.active_element(), Some(title));
    assert_eq!(main_hidden(&app).as_deref(), Some("true"));
    assert!(doc.is_scroll_locked());
}

/// Scenario A: empty email blocks submission
#[tokio::test]
async fn test_missing_email_reports_error() {
    let mut app = App::with_config(test_config());
    app.open_form().expect("open form");

    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Kim");
    press(&mut app, KeyCode::Enter);

    let form = app.controller().form().expect("form still mounted");
    assert_eq!(
        form.errors().get(FieldKey::Email),
        Some("이메일을 입력해주세요.")
    );
    assert!(!form.errors().contains(FieldKey::Name));
    assert_eq!(app.document().active_element(), form.control(FieldKey::Email));
    assert!(app.bridge().is_open());

    assert!(app.next_event(Duration::from_millis(50)).await.is_none());
}

/// Scenario B: a complete form resolves the caller with its values
#[tokio::test]
async fn test_valid_submission_resolves_caller() {
    let mut app = App::with_config(test_config());
    let open_button = app.page().open_button();
    app.open_form().expect("open form");

    fill_required(&mut app, "Kim", "a@b.com");
    press(&mut app, KeyCode::Enter);

    let result = resolved_result(&mut app)
        .await
        .expect("resolved event")
        .expect("submitted result");
    assert_eq!(result.name(), "Kim");
    assert_eq!(result.email(), "a@b.com");
    assert_eq!(result.experience(), "0-3년");
    assert_eq!(result.github(), "");

    assert!(!app.bridge().is_open());
    assert!(!app.controller().is_open());
    assert_eq!(app.page().submitted(), Some(&result));
    assert_eq!(app.document().active_element(), open_button);
    assert_eq!(main_hidden(&app), None);
}

/// Scenario C: Escape resolves with nothing and restores the page
#[tokio::test]
async fn test_escape_cancels() {
    let mut app = App::with_config(test_config());
    let open_button = app.page().open_button();
    app.open_form().expect("open form");

    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "half typed");
    press(&mut app, KeyCode::Esc);

    assert_eq!(resolved_result(&mut app).await, Some(None));
    assert!(!app.bridge().is_open());
    assert!(app.controller().shell().is_none());
    assert!(app.document().find_by_role(Role::Dialog).is_none());
    assert_eq!(main_hidden(&app), None);
    assert!(!app.document().is_scroll_locked());
    assert_eq!(app.document().active_element(), open_button);
    assert!(app.page().submitted().is_none());
}

/// Scenario D: github is optional but must be a URL when given
#[tokio::test]
async fn test_github_field_rules() {
    let mut app = App::with_config(test_config());
    app.open_form().expect("open form");
    fill_required(&mut app, "Kim", "a@b.com");

    type_text(&mut app, "github dot com");
    press(&mut app, KeyCode::Enter);
    let form = app.controller().form().expect("form");
    assert_eq!(
        form.errors().get(FieldKey::Github),
        Some("올바른 URL 형식을 입력해주세요.")
    );
    let github = form.control(FieldKey::Github).expect("github control");
    assert_eq!(app.document().attribute(github, aria::INVALID), Some("true"));
    assert_eq!(
        app.document().attribute(github, aria::DESCRIBEDBY),
        Some("github-error")
    );

    app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
        .expect("clear");
    type_text(&mut app, "https://github.com/kim");
    assert!(app.controller().form().expect("form").errors().is_empty());
    press(&mut app, KeyCode::Enter);

    let result = resolved_result(&mut app)
        .await
        .expect("resolved event")
        .expect("submitted result");
    assert_eq!(result.github(), "https://github.com/kim");
}

#[tokio::test]
async fn test_tab_cycles_inside_dialog() {
    let mut app = App::with_config(test_config());
    app.open_form().expect("open form");

    // From the title, Shift+Tab lands on the last control
    press(&mut app, KeyCode::BackTab);
    let form = app.controller().form().expect("form");
    let submit = form.submit_button();
    let name = form.control(FieldKey::Name);
    assert_eq!(app.document().active_element(), submit);

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.document().active_element(), name);

    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.document().active_element(), submit);

    // Six controls: four fields and two buttons
    for _ in 0..6 {
        press(&mut app, KeyCode::Tab);
    }
    assert_eq!(app.document().active_element(), submit);
}

#[tokio::test]
async fn test_q_types_while_open() {
    let mut app = App::with_config(test_config());
    app.open_form().expect("open form");

    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('q'));

    assert!(!app.state().should_quit());
    let form = app.controller().form().expect("form");
    assert_eq!(form.state().data.name, "q");
}

#[tokio::test]
async fn test_second_open_is_rejected_and_reported() {
    let mut app = App::with_config(test_config());
    let first = app.open_form().expect("open form");

    assert!(app.open_form().is_err());
    assert_eq!(app.bridge().current_request(), Some(first));
}

#[tokio::test]
async fn test_submit_delay_defers_resolution() {
    let mut config = test_config();
    config.modal.submit_delay_ms = 200;
    let mut app = App::with_config(config);
    app.open_form().expect("open form");

    fill_required(&mut app, "Kim", "a@b.com");
    press(&mut app, KeyCode::Enter);

    let form = app.controller().form().expect("form");
    assert!(form.is_submitting());
    let submit = form.submit_button().expect("submit");
    assert_eq!(
        app.document().node(submit).map(|n| n.text()),
        Some("제출 중...")
    );
    assert!(app.bridge().is_open());

    app.tick(Instant::now() + Duration::from_millis(250));
    assert!(!app.bridge().is_open());
    assert!(matches!(resolved_result(&mut app).await, Some(Some(_))));
}

#[tokio::test]
async fn test_queue_policy_reopens_fresh_form() {
    let mut config = test_config();
    config.modal.reentry_policy = ReentryPolicy::Queue;
    let mut app = App::with_config(config);

    let first = app.open_form().expect("first");
    let second = app.open_form().expect("second");

    press(&mut app, KeyCode::Esc);
    assert!(app.controller().is_open());
    assert_eq!(app.controller().active_request(), Some(second));

    match app.next_event(WAIT).await {
        Some(AppEvent::FormResolved { request_id, result, .. }) => {
            assert_eq!(request_id, first);
            assert!(result.is_none());
        }
        other => panic!("unexpected event: {:?}", other),
    }

    press(&mut app, KeyCode::Esc);
    assert!(!app.controller().is_open());
}

#[tokio::test]
async fn test_page_keys_open_and_quit() {
    let mut app = App::with_config(test_config());

    press(&mut app, KeyCode::Enter);
    assert!(app.controller().is_open());
    press(&mut app, KeyCode::Esc);
    assert!(!app.controller().is_open());

    press(&mut app, KeyCode::Char('q'));
    assert!(app.state().should_quit());
}

#[tokio::test]
async fn test_demo_session_submits() {
    let result = run_demo(test_config())
        .await
        .expect("demo session")
        .expect("demo submits");
    assert_eq!(result.name(), "Kim");
    assert_eq!(result.email(), "kim@example.com");
    assert_eq!(result.github(), "https://github.com/kim");
}
