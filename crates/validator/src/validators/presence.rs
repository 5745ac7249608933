//! Rules that run on empty input: `required` and `accept`.

use async_trait::async_trait;

use crate::foundation::{Input, Outcome, Rule, RuleContext, ValidatorResult};
use crate::grammar::RuleArg;

/// Text a checkbox-like field submits when it is off.
const UNCHECKED_VALUES: [&str; 4] = ["false", "0", "off", "no"];

/// Non-blank text, or at least one selected file.
///
/// File inputs that are missing from the data still count as filled when
/// the live form reports a selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

#[async_trait]
impl Rule for Required {
    fn checks_empty(&self) -> bool {
        true
    }

    async fn check(
        &self,
        input: Input<'_>,
        _arg: &RuleArg,
        cx: &mut RuleContext<'_>,
    ) -> ValidatorResult<Outcome> {
        let filled = match input {
            Input::Text(text) => !text.trim().is_empty(),
            Input::File(file) => !file.is_placeholder() || cx.lookup().selected_files(cx.field()) > 0,
            Input::Absent => cx.lookup().selected_files(cx.field()) > 0,
        };
        Ok(filled.into())
    }
}

/// A checked checkbox, or a truthy submitted value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accept;

#[async_trait]
impl Rule for Accept {
    fn checks_empty(&self) -> bool {
        true
    }

    async fn check(
        &self,
        input: Input<'_>,
        _arg: &RuleArg,
        cx: &mut RuleContext<'_>,
    ) -> ValidatorResult<Outcome> {
        let checked = cx.lookup().is_checked(cx.field());
        let accepted = match input {
            Input::Text(text) if !text.trim().is_empty() => checked.unwrap_or_else(|| {
                let text = text.trim();
                !UNCHECKED_VALUES
                    .iter()
                    .any(|unchecked| unchecked.eq_ignore_ascii_case(text))
            }),
            Input::File(_) => checked.unwrap_or(true),
            _ => checked == Some(true),
        };
        Ok(accepted.into())
    }
}
