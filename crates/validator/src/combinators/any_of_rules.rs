//! `any_of_rules`: the owner's value must satisfy one of several rule lists.
//!
//! ```json
//! {"id": {"any_of_rules": ["email", "numb|min:6"]}}
//! ```

use smallvec::smallvec;
use tracing::debug;

use super::aggregate_message;
use crate::foundation::{
    ConditionalGroupResult, FieldEvaluator, FieldValue, GroupFailure, RunMode, ValidatorResult,
};
use crate::registry::RuleList;

/// Tries each alternative on the owner's values until one passes.
pub async fn any_of_rules<E>(
    eval: &mut E,
    owner: &str,
    values: &[FieldValue],
    alternatives: &[RuleList],
) -> ValidatorResult<ConditionalGroupResult>
where
    E: FieldEvaluator + ?Sized,
{
    let mut last_message = None;
    for (index, rules) in alternatives.iter().enumerate() {
        let verdict = eval
            .evaluate(owner, values, rules, RunMode::ShortCircuit)
            .await?;
        if verdict.passed {
            debug!(owner, alternative = index, "any_of_rules satisfied");
            return Ok(ConditionalGroupResult::passed(smallvec![owner.to_owned()]));
        }
        if verdict.message.is_some() {
            last_message = verdict.message;
        }
    }

    debug!(owner, tried = alternatives.len(), "any_of_rules unsatisfied");
    let aggregate =
        aggregate_message(eval.messages(), owner, "any_of_rules", last_message.as_deref());
    Ok(ConditionalGroupResult::failed(
        GroupFailure::NoneMatched,
        Some(aggregate),
    ))
}
