//! `notRule`: logical negation of a rule list on the owner's own value.
//!
//! The wrapped rules all run; the owner passes unless every one of them
//! passes.
//!
//! ```json
//! {"username": {"notRule": "inList:admin,root"}}
//! ```

use smallvec::smallvec;
use tracing::debug;

use crate::foundation::{
    ConditionalGroupResult, FieldEvaluator, FieldValue, GroupFailure, RunMode, ValidatorResult,
};
use crate::registry::RuleList;

const RULE: &str = "notRule";

pub async fn not_rule<E>(
    eval: &mut E,
    owner: &str,
    values: &[FieldValue],
    rules: &RuleList,
) -> ValidatorResult<ConditionalGroupResult>
where
    E: FieldEvaluator + ?Sized,
{
    let nested = eval
        .evaluate(owner, values, rules, RunMode::ToCompletion)
        .await?;
    debug!(owner, inner_passed = nested.passed, "notRule resolved");
    if !nested.passed {
        return Ok(ConditionalGroupResult::passed(smallvec![owner.to_owned()]));
    }

    let messages = eval.messages();
    let message = messages
        .custom()
        .message(owner, RULE)
        .map_or_else(|| messages.catalog_or_fallback(RULE), str::to_owned);
    Ok(ConditionalGroupResult::failed(GroupFailure::Negated, Some(message)))
}
