//! Whole-form verification and error map lifecycle.

use std::sync::Arc;

use formvalidator::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn validator() -> Arc<Validator> {
    Arc::new(Validator::new(ValidatorConfig::default()).unwrap())
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn signup() -> Value {
    json!({
        "name": "required|alpha|min:2",
        "email": ["required", "email"],
        "age": "numb|minnumb:18",
        "terms": "accept"
    })
}

#[tokio::test]
async fn test_reports_every_failing_field() {
    let context = validator()
        .verify_data(
            &signup(),
            object(json!({"name": "J", "email": "nope", "age": "16"})),
            CustomMessages::new(),
        )
        .await
        .unwrap();

    insta::assert_json_snapshot!(context.errors(), @r#"
    {
      "name": "The field should contain a minimum of 2 characters.",
      "email": "Please provide a valid email address.",
      "age": "The value should be at least 18.",
      "terms": "Please check this checkbox."
    }
    "#);
}

#[tokio::test]
async fn test_rerun_leaves_no_stale_errors() {
    let mut context = validator().context(&signup()).unwrap();
    let broken = object(json!({"name": "J", "email": "nope", "terms": "on"}));
    assert!(!context.verify_data_with(broken).await.unwrap());
    assert_eq!(context.errors().len(), 2);

    let fixed = object(json!({"name": "Jo", "email": "jo@example.com", "terms": "on"}));
    assert!(context.verify_data_with(fixed).await.unwrap());
    assert!(context.errors().is_empty());
}

#[tokio::test]
async fn test_single_field_verification() {
    let mut context = validator()
        .context(&signup())
        .unwrap()
        .with_data(object(json!({"name": "J1"})));

    assert!(!context.verify_field("name").await.unwrap());
    assert_eq!(
        context.error("name"),
        Some("This field may only contain alphabetic characters.")
    );
    assert_eq!(context.errors().len(), 1);
    assert!(context.verify_field("undeclared").await.unwrap());
}

#[tokio::test]
async fn test_multi_valued_fields_check_every_value() {
    let rules = json!({"tags": "alpha"});
    let data: FormData = [("tags", "rust"), ("tags", "go2")].into_iter().collect();
    let context = validator()
        .verify_data(&rules, data, CustomMessages::new())
        .await
        .unwrap();
    assert_eq!(
        context.error("tags"),
        Some("This field may only contain alphabetic characters.")
    );
}

#[tokio::test]
async fn test_explicit_verify_with_to_completion() {
    let mut context = validator().context(&json!({})).unwrap();
    let rules = validator().registry().compile(&json!("numb|min:4")).unwrap();
    let passed = context
        .verify("pin", &[FieldValue::text("ab")], &rules, RunMode::ToCompletion)
        .await
        .unwrap();
    assert!(!passed);
    assert_eq!(
        context.error("pin"),
        Some("This field needs to be a valid number without any space.")
    );
}

#[tokio::test]
async fn test_config_from_json_pins_the_clock() {
    let config = ValidatorConfig::from_json(r#"{"now": "2024-06-15T12:00:00"}"#).unwrap();
    let validator = Arc::new(Validator::new(config).unwrap());
    let rules = json!({"birthday": "shouldOld:18"});

    let adult = validator
        .verify_data(&rules, object(json!({"birthday": "2006-06-15"})), CustomMessages::new())
        .await
        .unwrap();
    assert!(adult.is_valid());

    let minor = validator
        .verify_data(&rules, object(json!({"birthday": "2006-06-16"})), CustomMessages::new())
        .await
        .unwrap();
    assert!(!minor.is_valid());
}

#[tokio::test]
async fn test_broken_rule_sets_are_errors_not_verdicts() {
    let error = validator()
        .context(&json!({"n": "min:four"}))
        .unwrap_err();
    assert_eq!(error.category(), "argument");

    let error = validator().context(&json!({"n": "nope"})).unwrap_err();
    assert_eq!(error.code(), "RULE_UNKNOWN");
}
