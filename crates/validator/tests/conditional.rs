//! Conditional groups through a full verification pass.

use std::sync::Arc;

use formvalidator::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

async fn verify(rules: Value, data: Value, messages: Value) -> ValidationContext {
    let validator = Arc::new(Validator::new(ValidatorConfig::default()).unwrap());
    let data = data.as_object().cloned().unwrap();
    validator
        .verify_data(&rules, data, CustomMessages::from_value(messages))
        .await
        .unwrap()
}

fn keys(context: &ValidationContext) -> Vec<&str> {
    context.errors().keys().map(String::as_str).collect()
}

// ============================================================================
// any_of
// ============================================================================

#[rstest]
#[case(json!({"a": "x", "b": ""}), true)]
#[case(json!({"a": "", "b": "y"}), true)]
#[case(json!({"a": "x", "b": "y"}), true)]
#[case(json!({"a": "", "b": " "}), false)]
#[tokio::test]
async fn test_any_of_needs_one_filled(#[case] data: Value, #[case] passes: bool) {
    let rules = json!({"owner": {"any_of": {"a": "required", "b": "required"}}});
    let context = verify(rules, data, json!({})).await;
    assert_eq!(context.is_valid(), passes);
    if !passes {
        assert_eq!(keys(&context), vec!["owner"]);
    }
}

#[tokio::test]
async fn test_any_of_owner_message_override() {
    let rules = json!({"owner": {"any_of": {"a": "required", "b": "required"}}});
    let messages = json!({"owner": {"any_of": "Fill in a or b"}});
    let context = verify(rules, json!({}), messages).await;
    assert_eq!(context.error("owner"), Some("Fill in a or b"));
}

// ============================================================================
// only_any_of
// ============================================================================

fn exclusive() -> Value {
    json!({"owner": {"only_any_of": {"field1": "email", "field2": "numb"}}})
}

#[tokio::test]
async fn test_only_any_of_single_match_passes() {
    let context = verify(exclusive(), json!({"field1": "x@y.com", "field2": ""}), json!({})).await;
    assert!(context.is_valid());
}

#[tokio::test]
async fn test_only_any_of_multiple_and_none() {
    let multiple = verify(exclusive(), json!({"field1": "x@y.com", "field2": "5"}), json!({})).await;
    assert_eq!(
        multiple.error("owner"),
        Some("Only one of these fields may be filled in.")
    );

    let none = verify(exclusive(), json!({"field1": "", "field2": ""}), json!({})).await;
    assert_eq!(none.error("owner"), Some("Please fill in one of these fields."));
}

#[tokio::test]
async fn test_only_any_of_keyed_overrides() {
    let messages = json!({"owner": {"only_any_of": {
        "matchMultiple": "Just one, please",
        "matchNone": "Pick one"
    }}});
    let context = verify(
        exclusive(),
        json!({"field1": "x@y.com", "field2": "5"}),
        messages.clone(),
    )
    .await;
    assert_eq!(context.error("owner"), Some("Just one, please"));

    let context = verify(exclusive(), json!({}), messages).await;
    assert_eq!(context.error("owner"), Some("Pick one"));
}

#[tokio::test]
async fn test_make_invalid_empty_marks_the_other_field() {
    let rules = json!({"owner": {"only_any_of": {
        "fields": {"card": "numb", "iban": "alphaNumeric"},
        "makeInvalidEmpty": true
    }}});
    let context = verify(rules, json!({"card": "4111", "iban": "DE-89"}), json!({})).await;
    assert_eq!(keys(&context), vec!["iban"]);
    assert_eq!(context.error("iban"), Some("Please make this field empty."));
}

// ============================================================================
// any_of_rules and notRule
// ============================================================================

#[rstest]
#[case("x@y.com", None)]
#[case("12345", None)]
#[case("", None)]
#[case("x@", Some("This field needs to be a valid number without any space."))]
#[tokio::test]
async fn test_any_of_rules_alternatives(#[case] value: &str, #[case] error: Option<&str>) {
    let rules = json!({"id": {"any_of_rules": ["email", "numb"]}});
    let context = verify(rules, json!({"id": value}), json!({})).await;
    assert_eq!(context.error("id"), error);
}

#[rstest]
#[case("admin", Some("This field matches a value it should not match."))]
#[case("alice", None)]
#[case("", None)]
#[tokio::test]
async fn test_not_rule(#[case] value: &str, #[case] error: Option<&str>) {
    let rules = json!({"username": {"notRule": "inList:admin,root"}});
    let context = verify(rules, json!({"username": value}), json!({})).await;
    assert_eq!(context.error("username"), error);
}

#[tokio::test]
async fn test_group_failures_stay_off_participants() {
    let rules = json!({
        "owner": {"any_of": {"a": "required|email", "b": "required|numb"}},
        "a": "min:1"
    });
    let context = verify(rules, json!({"a": "bad", "b": "x"}), json!({})).await;
    assert_eq!(keys(&context), vec!["owner"]);
    assert_eq!(context.conditional_errors()["owner"]["any_of"].len(), 2);
}
