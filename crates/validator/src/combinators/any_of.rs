//! `any_of`: the owner is valid when any listed field passes its own rules.
//!
//! ```json
//! {"contact": {"any_of": {"email": "required|email", "phone": "required|numb"}}}
//! ```

use indexmap::IndexMap;
use smallvec::smallvec;
use tracing::debug;

use super::{aggregate_message, check_participant, last_staged};
use crate::foundation::{ConditionalGroupResult, FieldEvaluator, GroupFailure, ValidatorResult};
use crate::registry::RuleList;

/// Evaluates `fields` in order and stops at the first that passes.
///
/// Failing fields' messages are staged in the result, never written to the
/// visible error map.
pub async fn any_of<E>(
    eval: &mut E,
    owner: &str,
    fields: &IndexMap<String, RuleList>,
) -> ValidatorResult<ConditionalGroupResult>
where
    E: FieldEvaluator + ?Sized,
{
    let mut staged = IndexMap::new();
    for (field, rules) in fields {
        let (satisfied, message) = check_participant(eval, field, rules).await?;
        if satisfied {
            debug!(owner, field = %field, "any_of satisfied");
            return Ok(ConditionalGroupResult::passed(smallvec![field.clone()]));
        }
        if let Some(message) = message {
            staged.insert(field.clone(), message);
        }
    }

    debug!(owner, tried = fields.len(), "any_of unsatisfied");
    let aggregate = aggregate_message(eval.messages(), owner, "any_of", last_staged(&staged));
    Ok(ConditionalGroupResult::failed(GroupFailure::NoneMatched, Some(aggregate)).with_staged(staged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::combinators::testing::Fixture;

    fn fields(fixture: &Fixture, spec: serde_json::Value) -> IndexMap<String, RuleList> {
        let serde_json::Value::Object(spec) = spec else {
            unreachable!()
        };
        spec.iter()
            .map(|(field, rules)| (field.clone(), fixture.compile(rules.clone())))
            .collect()
    }

    #[tokio::test]
    async fn test_first_passing_field_wins() {
        let mut fixture = Fixture::new(json!({"email": "", "phone": "5551234"}));
        let group = fields(&fixture, json!({"email": "required|email", "phone": "required|numb"}));

        let result = any_of(&mut fixture.pass(), "contact", &group).await.unwrap();
        assert!(result.passed);
        assert_eq!(result.passing.as_slice(), ["phone".to_owned()]);
        assert!(result.aggregate_message.is_none());
    }

    #[tokio::test]
    async fn test_failure_stages_messages_and_uses_last() {
        let mut fixture = Fixture::new(json!({"email": "nope", "phone": ""}));
        let group = fields(&fixture, json!({"email": "email", "phone": "required"}));

        let result = any_of(&mut fixture.pass(), "contact", &group).await.unwrap();
        assert!(!result.passed);
        assert_eq!(result.failure, Some(GroupFailure::NoneMatched));
        assert_eq!(
            result.per_subfield.get("email").map(String::as_str),
            Some("Please provide a valid email address.")
        );
        assert_eq!(result.aggregate_message.as_deref(), Some("This field is required."));
    }

    #[tokio::test]
    async fn test_owner_override_wins() {
        let mut fixture = Fixture::new(json!({}))
            .with_messages(json!({"contact": {"any_of": "Give us a way to reach you"}}));
        let group = fields(&fixture, json!({"email": "required", "phone": "required"}));

        let result = any_of(&mut fixture.pass(), "contact", &group).await.unwrap();
        assert_eq!(
            result.aggregate_message.as_deref(),
            Some("Give us a way to reach you")
        );
        assert_eq!(result.per_subfield.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_field_does_not_satisfy() {
        let mut fixture = Fixture::new(json!({"email": "", "phone": " "}));
        let group = fields(&fixture, json!({"email": "email", "phone": "numb"}));

        let result = any_of(&mut fixture.pass(), "contact", &group).await.unwrap();
        assert!(!result.passed);
        assert!(result.per_subfield.is_empty());
        assert_eq!(
            result.aggregate_message.as_deref(),
            Some("At least one of the related fields needs a valid value.")
        );
    }
}
