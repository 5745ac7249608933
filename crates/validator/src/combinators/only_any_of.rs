//! `only_any_of`: exactly one listed field may pass its rules.
//!
//! ```json
//! {"owner": {"only_any_of": {
//!     "fields": {"card": "required|numb", "iban": "required"},
//!     "makeInvalidEmpty": true
//! }}}
//! ```
//!
//! With `makeInvalidEmpty`, a single passing field turns every other filled
//! participant into a culprit that must be emptied.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use super::check_participant;
use crate::foundation::{ConditionalGroupResult, FieldEvaluator, GroupFailure, ValidatorResult};
use crate::registry::RuleList;

const RULE: &str = "only_any_of";

pub async fn only_any_of<E>(
    eval: &mut E,
    owner: &str,
    fields: &IndexMap<String, RuleList>,
    make_invalid_empty: bool,
) -> ValidatorResult<ConditionalGroupResult>
where
    E: FieldEvaluator + ?Sized,
{
    let mut passing: SmallVec<[String; 2]> = SmallVec::new();
    let mut staged = IndexMap::new();
    for (field, rules) in fields {
        let (satisfied, message) = check_participant(eval, field, rules).await?;
        if satisfied {
            passing.push(field.clone());
        } else if let Some(message) = message {
            staged.insert(field.clone(), message);
        }
    }
    debug!(owner, passing = passing.len(), "only_any_of resolved");

    let messages = eval.messages();
    let group_message = |key: &str| {
        messages
            .custom()
            .group_message(owner, RULE, key)
            .map(str::to_owned)
    };

    match passing.len() {
        1 => {
            let culprits: IndexMap<String, String> = if make_invalid_empty {
                let message = group_message("makeInvalidEmpty")
                    .unwrap_or_else(|| messages.catalog_or_fallback("makeInvalidEmpty"));
                fields
                    .keys()
                    .filter(|field| **field != passing[0] && eval.is_filled(field))
                    .map(|field| (field.clone(), message.clone()))
                    .collect()
            } else {
                IndexMap::new()
            };
            if culprits.is_empty() {
                return Ok(ConditionalGroupResult::passed(passing));
            }
            debug!(owner, culprits = culprits.len(), "only_any_of needs fields emptied");
            let mut result = ConditionalGroupResult::failed(GroupFailure::MustBeEmpty, None)
                .with_staged(staged);
            result.passing = passing;
            result.must_be_empty = culprits;
            Ok(result)
        }
        0 => {
            let message = group_message("matchNone")
                .or_else(|| staged.get(owner).cloned())
                .unwrap_or_else(|| messages.catalog_or_fallback("matchNone"));
            Ok(ConditionalGroupResult::failed(GroupFailure::MatchNone, Some(message))
                .with_staged(staged))
        }
        _ => {
            let message = group_message("matchMultiple")
                .unwrap_or_else(|| messages.catalog_or_fallback("matchMultiple"));
            let mut result =
                ConditionalGroupResult::failed(GroupFailure::MatchMultiple, Some(message))
                    .with_staged(staged);
            result.passing = passing;
            Ok(result)
        }
    }
}
