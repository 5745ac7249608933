//! Validates a sign-up form once on submit, then live while it is edited.
//!
//! Run with: `cargo run --example signup_form`

use std::sync::Arc;
use std::time::Duration;

use formvalidator::prelude::*;
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ValidatorError> {
    tracing_subscriber::fmt().with_target(false).init();

    let validator = Arc::new(Validator::new(ValidatorConfig::default())?);
    let rules = json!({
        "name": "required|alpha|min:2",
        "email": ["required", "email"],
        "contact": {"any_of": {"phone": "required|numb", "email": "required|email"}},
        "terms": "accept",
    });
    let messages = CustomMessages::from_value(json!({
        "name": {"min": "Your name needs at least {min} letters."},
        "contact": {"any_of": "Leave a phone number or an email address."},
    }));

    // Submit-time check over a plain JSON object.
    let submitted = json!({"name": "J", "email": "", "terms": "on"});
    let context = validator
        .verify_data(
            &rules,
            submitted.as_object().cloned().unwrap_or_default(),
            messages.clone(),
        )
        .await?;
    println!("submit:");
    for (field, message) in context.errors() {
        println!("  {field}: {message}");
    }

    // Live checks while typing.
    let live = LiveValidator::new(
        validator.context(&rules)?.with_messages(messages),
        Arc::new(FormState::new()),
        LiveConfig::default().with_throttle(Duration::from_millis(100)),
    );
    live.on_report(|report| println!("live {:?}: passed={}", report.trigger, report.passed));

    for handle in live.input("name", "Jo") {
        let _ = handle.await;
    }
    for handle in live.input("email", "jo@example.com") {
        let _ = handle.await;
    }
    println!("remaining errors: {:?}", live.errors().await);
    Ok(())
}
