//! Extension points: atomic rules and field evaluation.

use async_trait::async_trait;

use super::context::RuleContext;
use super::error::ValidatorResult;
use super::outcome::{FieldVerdict, Outcome, RunMode};
use super::value::{FieldValue, Input};
use crate::grammar::{ArgKind, RuleArg};
use crate::messages::MessageResolver;
use crate::registry::RuleList;

// ============================================================================
// RULE
// ============================================================================

/// A named predicate over one element of a field.
///
/// Rules are stored as `Arc<dyn Rule>` in a [`RuleRegistry`], so the trait
/// stays object safe; `async_trait` boxes the returned future.
///
/// [`RuleRegistry`]: crate::registry::RuleRegistry
///
/// # Examples
///
/// ```rust,ignore
/// struct Even;
///
/// #[async_trait::async_trait]
/// impl Rule for Even {
///     async fn check(&self, input: Input<'_>, _: &RuleArg, cx: &mut RuleContext<'_>)
///         -> ValidatorResult<Outcome>
///     {
///         match input.text() {
///             Some(text) => Ok(text.parse::<i64>().is_ok_and(|n| n % 2 == 0).into()),
///             None => Ok(cx.skip_non_text(input)),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Rule: Send + Sync {
    /// Shape of the argument, parsed when the rule set is compiled.
    fn arg_kind(&self) -> ArgKind {
        ArgKind::None
    }

    /// Whether the rule also runs on empty input. Every other rule passes
    /// empty input without being called.
    fn checks_empty(&self) -> bool {
        false
    }

    async fn check(
        &self,
        input: Input<'_>,
        arg: &RuleArg,
        cx: &mut RuleContext<'_>,
    ) -> ValidatorResult<Outcome>;
}

// ============================================================================
// FIELD EVALUATOR
// ============================================================================

/// Runs compiled rule lists against fields of the current data.
///
/// Conditional groups are written against this trait so they can evaluate
/// other fields without touching the visible error map.
#[async_trait]
pub trait FieldEvaluator: Send {
    /// Current values of `field`.
    fn values(&self, field: &str) -> Vec<FieldValue>;

    /// `true` when `field` holds content, including selected files the data
    /// source does not carry.
    fn is_filled(&self, field: &str) -> bool;

    fn messages(&self) -> MessageResolver<'_>;

    /// Drops per-field state such as cached dates before `field` is
    /// evaluated afresh.
    fn reset_field(&mut self, field: &str);

    async fn evaluate(
        &mut self,
        field: &str,
        values: &[FieldValue],
        rules: &RuleList,
        mode: RunMode,
    ) -> ValidatorResult<FieldVerdict>;
}
