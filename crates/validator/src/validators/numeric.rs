//! Digit strings and numeric bounds.

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::Outcome;
use crate::grammar::RuleArg;
use crate::messages::format_number;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static DIGITS_SPACED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9 ]+$").unwrap());
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// The text as a finite number, ignoring surrounding whitespace.
fn numeric(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

crate::text_rule! {
    /// ASCII digits only.
    pub Numb;
    arg: None;
    rule(text, arg) { DIGITS.is_match(text) }
}

crate::text_rule! {
    /// Digits and single spaces; `numb_space:1` reports doubled spaces on
    /// their own.
    pub NumbSpace;
    arg: Flag;
    check(text, arg, cx) {
        let text = text.trim();
        if !DIGITS_SPACED.is_match(text) {
            return Ok(Outcome::Failed);
        }
        if arg.flag() && SPACE_RUN.is_match(text) {
            return Ok(cx.report("numb_space_double", &[]));
        }
        Ok(Outcome::Passed)
    }
}

crate::text_rule! {
    pub MinNumb;
    arg: Number;
    rule(text, arg) {
        matches!((numeric(text), arg.as_number()), (Some(value), Some(min)) if value >= min)
    }
}

crate::text_rule! {
    pub MaxNumb;
    arg: Number;
    rule(text, arg) {
        matches!((numeric(text), arg.as_number()), (Some(value), Some(max)) if value <= max)
    }
}

crate::text_rule! {
    /// Inclusive numeric interval.
    pub Range;
    arg: Range;
    check(text, arg, cx) {
        let RuleArg::Range(low, high) = *arg else {
            return Ok(Outcome::Failed);
        };
        if numeric(text).is_some_and(|value| value >= low && value <= high) {
            return Ok(Outcome::Passed);
        }
        let (low, high) = (format_number(low), format_number(high));
        Ok(cx.report("range", &[("num1", &low), ("num2", &high)]))
    }
}
