//! End-to-end tests for the form controller.

mod common;
use common::*;

use std::sync::Arc;

use folio_forms::{
    FormConfig, FormController, Level, MemorySink, SubmitOutcome, SUBMIT_ERROR_KEY,
    SUBMIT_FAILURE_MESSAGE,
};

fn fill(controller: &FormController) {
    controller.handle_change("name", "Ann");
    controller.handle_change("email", "ann@x.com");
    controller.handle_change("message", "hi");
}

#[tokio::test]
async fn successful_submit_clears_state() {
    let handler = RecordingHandler::accepting();
    let calls = handler.calls();
    let controller = FormController::new(handler);
    fill(&controller);

    let outcome = controller.handle_submit().await;

    assert_eq!(outcome, SubmitOutcome::Submitted);
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        form(&[("name", "Ann"), ("email", "ann@x.com"), ("message", "hi")])
    );
    assert!(controller.form_data().is_empty());
    assert!(controller.errors().is_empty());
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn failed_submit_keeps_input() {
    let handler = RecordingHandler::rejecting();
    let calls = handler.calls();
    let controller = FormController::new(handler);
    fill(&controller);
    let before = controller.form_data();

    let outcome = controller.handle_submit().await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(controller.form_data(), before);
    assert_eq!(
        controller.error(SUBMIT_ERROR_KEY).as_deref(),
        Some(SUBMIT_FAILURE_MESSAGE)
    );
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn resubmit_after_failure_succeeds() {
    let sink = Arc::new(MemorySink::new());
    let controller = FormController::new(RecordingHandler::rejecting())
        .with_diagnostics(sink.clone());
    fill(&controller);
    assert_eq!(controller.handle_submit().await, SubmitOutcome::Failed);
    assert_eq!(sink.entries_at(Level::Error).len(), 1);

    // Same input, new handler: the preserved values go through unchanged.
    let handler = RecordingHandler::accepting();
    let calls = handler.calls();
    let retry = FormController::new(handler);
    retry.set_form_data(controller.form_data());
    assert_eq!(retry.handle_submit().await, SubmitOutcome::Submitted);
    assert_eq!(calls.lock().unwrap()[0]["message"], "hi");
}

#[tokio::test]
async fn invalid_submit_never_reaches_handler() {
    let handler = RecordingHandler::accepting();
    let calls = handler.calls();
    let controller = FormController::new(handler);
    controller.handle_change("name", "   ");
    controller.handle_change("email", "ann.x.com");

    let outcome = controller.handle_submit().await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert_eq!(errors.get("name"), Some("name is required"));
    assert_eq!(errors.get("email"), Some("Invalid email format"));
    assert!(calls.lock().unwrap().is_empty());
    assert!(!controller.is_submitting());
    assert_eq!(controller.value("name").as_deref(), Some("   "));
}

#[tokio::test]
async fn concurrent_submit_is_ignored() {
    let handler = RecordingHandler::accepting();
    let calls = handler.calls();
    let controller = FormController::new(handler);
    fill(&controller);

    let (first, second) = tokio::join!(controller.handle_submit(), controller.handle_submit());

    assert_eq!(first, SubmitOutcome::Submitted);
    assert_eq!(second, SubmitOutcome::AlreadySubmitting);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert!(controller.form_data().is_empty());
    assert!(controller.errors().is_empty());
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn concurrent_submit_during_failure_is_ignored() {
    let handler = RecordingHandler::rejecting();
    let calls = handler.calls();
    let controller = FormController::new(handler);
    fill(&controller);

    let (first, second) = tokio::join!(controller.handle_submit(), controller.handle_submit());

    assert_eq!(first, SubmitOutcome::Failed);
    assert_eq!(second, SubmitOutcome::AlreadySubmitting);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(controller.errors().len(), 1);
    assert_eq!(controller.form_data().len(), 3);
}

#[tokio::test]
async fn contact_form_requires_untouched_fields() {
    let controller = FormController::contact(RecordingHandler::accepting());
    controller.handle_change("name", "Ann");

    let outcome = controller.handle_submit().await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert_eq!(errors.get("email"), Some("email is required"));
    assert_eq!(errors.get("message"), Some("message is required"));

    controller.handle_change("email", "ann@x.com");
    controller.handle_change("message", "Let's talk");
    assert_eq!(controller.handle_submit().await, SubmitOutcome::Submitted);
}

#[tokio::test]
async fn edits_clear_errors_one_field_at_a_time() {
    let controller = FormController::new(RecordingHandler::accepting())
        .with_config(FormConfig::new().required_fields(["name", "email", "message"]));

    controller.handle_submit().await;
    assert_eq!(controller.errors().len(), 3);

    controller.handle_change("email", "x");
    assert_eq!(controller.errors().len(), 2);
    assert!(controller.error("email").is_none());
    assert!(controller.error("name").is_some());
}

#[tokio::test]
async fn contact_form_accepts_long_name() {
    let handler = RecordingHandler::accepting();
    let calls = handler.calls();
    let controller = FormController::contact(handler);
    controller.handle_change("name", "A".repeat(101));
    controller.handle_change("email", "ann@x.com");
    controller.handle_change("message", "hi");

    assert_eq!(controller.handle_submit().await, SubmitOutcome::Submitted);
    assert_eq!(calls.lock().unwrap()[0]["name"].len(), 101);
}
