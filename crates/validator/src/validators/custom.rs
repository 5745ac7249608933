//! Closure-backed rules registered at runtime.

use std::fmt;

use async_trait::async_trait;

use crate::foundation::{Input, Outcome, Rule, RuleContext, ValidatorResult};
use crate::grammar::{ArgKind, RuleArg};

/// Wraps a predicate over the text and the raw argument.
///
/// The argument is passed through as [`RuleArg::Raw`], or
/// [`RuleArg::None`] when the rule was written without one.
pub struct FnRule<F> {
    check: F,
}

impl<F> FnRule<F>
where
    F: Fn(&str, &RuleArg) -> bool + Send + Sync,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Rule for FnRule<F>
where
    F: Fn(&str, &RuleArg) -> bool + Send + Sync,
{
    fn arg_kind(&self) -> ArgKind {
        ArgKind::Any
    }

    async fn check(
        &self,
        input: Input<'_>,
        arg: &RuleArg,
        cx: &mut RuleContext<'_>,
    ) -> ValidatorResult<Outcome> {
        match input.text() {
            Some(text) => Ok((self.check)(text, arg).into()),
            None => Ok(cx.skip_non_text(input)),
        }
    }
}
