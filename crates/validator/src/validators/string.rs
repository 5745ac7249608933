//! Character-class, length and comparison rules for text.

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::Outcome;
use crate::grammar::RuleArg;

static ALPHA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{L}+$").unwrap());
static ALPHA_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L}\s]+$").unwrap());
static ALPHA_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}]+$").unwrap());
static ALPHA_NUMERIC_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}\s]+$").unwrap());
static LOWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{Lowercase}+$").unwrap());
static LOWER_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Lowercase}\s]+$").unwrap());
static UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{Uppercase}+$").unwrap());
static UPPER_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Uppercase}\s]+$").unwrap());
static HAS_LOWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Lowercase}").unwrap());
static HAS_UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Uppercase}").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub(crate) fn has_digit(text: &str) -> bool {
    text.bytes().any(|byte| byte.is_ascii_digit())
}

pub(crate) fn has_whitespace(text: &str) -> bool {
    text.chars().any(char::is_whitespace)
}

/// `true` when every whitespace run is a single plain space.
pub(crate) fn single_spaced(text: &str) -> bool {
    WHITESPACE_RUN.replace_all(text, " ") == text
}

/// Trimmed length in characters.
fn trimmed_len(text: &str) -> f64 {
    text.trim().chars().count() as f64
}

/// Fails plainly, or with the `_s` message when spaces were allowed.
fn class_outcome(passed: bool, allow_space: bool, cx: &crate::foundation::RuleContext<'_>) -> Outcome {
    match (passed, allow_space) {
        (true, _) => Outcome::Passed,
        (false, false) => Outcome::Failed,
        (false, true) => cx.report(&format!("{}_s", cx.rule()), &[]),
    }
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

crate::text_rule! {
    /// Letters only; `alpha:1` also allows whitespace.
    pub Alpha;
    arg: Flag;
    check(text, arg, cx) {
        let pattern = if arg.flag() { &ALPHA_SPACE } else { &ALPHA };
        Ok(class_outcome(pattern.is_match(text), arg.flag(), cx))
    }
}

crate::text_rule! {
    /// Letters and numbers; `alphaNumeric:1` also allows whitespace.
    pub AlphaNumeric;
    arg: Flag;
    check(text, arg, cx) {
        let pattern = if arg.flag() { &ALPHA_NUMERIC_SPACE } else { &ALPHA_NUMERIC };
        Ok(class_outcome(pattern.is_match(text), arg.flag(), cx))
    }
}

crate::text_rule! {
    pub LowerCase;
    arg: Flag;
    rule(text, arg) {
        if arg.flag() { LOWER_SPACE.is_match(text) } else { LOWER.is_match(text) }
    }
}

crate::text_rule! {
    pub UpperCase;
    arg: Flag;
    rule(text, arg) {
        if arg.flag() { UPPER_SPACE.is_match(text) } else { UPPER.is_match(text) }
    }
}

crate::text_rule! {
    pub HasLowerCase;
    arg: None;
    rule(text, arg) { HAS_LOWER.is_match(text) }
}

crate::text_rule! {
    pub HasUpperCase;
    arg: None;
    rule(text, arg) { HAS_UPPER.is_match(text) }
}

crate::text_rule! {
    pub HasDigit;
    arg: None;
    rule(text, arg) { has_digit(text) }
}

crate::text_rule! {
    /// Matches the configured special-character class.
    pub HasSpecial;
    arg: None;
    check(text, arg, cx) {
        Ok(cx.special_chars().is_match(text).into())
    }
}

crate::text_rule! {
    pub NoSpecial;
    arg: None;
    check(text, arg, cx) {
        Ok((!cx.special_chars().is_match(text)).into())
    }
}

// ============================================================================
// WHITESPACE
// ============================================================================

crate::text_rule! {
    pub NoSpace;
    arg: None;
    rule(text, arg) { !has_whitespace(text) }
}

crate::text_rule! {
    /// At least one whitespace character; `space:1` also rejects runs.
    pub Space;
    arg: Flag;
    check(text, arg, cx) {
        if !has_whitespace(text) {
            return Ok(Outcome::Failed);
        }
        if arg.flag() && !single_spaced(text) {
            return Ok(cx.report("detectMultipleSpaces", &[]));
        }
        Ok(Outcome::Passed)
    }
}

crate::text_rule! {
    pub DetectMultipleSpaces;
    arg: None;
    rule(text, arg) { single_spaced(text) }
}

// ============================================================================
// LENGTH
// ============================================================================

crate::text_rule! {
    /// Trimmed length of at least the argument.
    pub Min;
    arg: Number;
    rule(text, arg) { arg.as_number().is_some_and(|min| trimmed_len(text) >= min) }
}

crate::text_rule! {
    /// Trimmed length of at most the argument.
    pub Max;
    arg: Number;
    rule(text, arg) { arg.as_number().is_some_and(|max| trimmed_len(text) <= max) }
}

// ============================================================================
// COMPOSITE AND CROSS-FIELD
// ============================================================================

crate::text_rule! {
    /// Lower, upper, digit, special and length, checked in that order.
    ///
    /// Reports the first failing sub-check under its own message key
    /// (`hasLowerCase`, `hasUpperCase`, `hasDigit`, `hasSpecial`, `min`).
    pub Password;
    arg: OptionalNumber;
    check(text, arg, cx) {
        let min = arg
            .as_number()
            .unwrap_or(cx.config().password_min_length as f64);
        let failed = if !HAS_LOWER.is_match(text) {
            Some("hasLowerCase")
        } else if !HAS_UPPER.is_match(text) {
            Some("hasUpperCase")
        } else if !has_digit(text) {
            Some("hasDigit")
        } else if !cx.special_chars().is_match(text) {
            Some("hasSpecial")
        } else if trimmed_len(text) < min {
            Some("min")
        } else {
            None
        };
        Ok(match failed {
            Some(key) => {
                let min = crate::messages::format_number(min);
                cx.report(key, &[("min", &min), ("password", &min)])
            }
            None => Outcome::Passed,
        })
    }
}

crate::text_rule! {
    /// Equal to the current value of the named field.
    pub Same;
    arg: Text;
    check(text, arg, cx) {
        let other = arg.as_text().and_then(|key| cx.other_text(key));
        Ok(other.is_some_and(|other| other == text).into())
    }
}

crate::text_rule! {
    pub InList;
    arg: List;
    rule(text, arg) { arg.as_list().is_some_and(|list| list.iter().any(|item| item == text)) }
}

crate::text_rule! {
    /// Matches a caller-supplied pattern.
    pub Matches;
    arg: Pattern;
    rule(text, arg) { matches!(arg, RuleArg::Pattern(pattern) if pattern.is_match(text)) }
}

crate::text_rule! {
    /// Does not match a caller-supplied pattern.
    pub NotMatches;
    arg: Pattern;
    rule(text, arg) { matches!(arg, RuleArg::Pattern(pattern) if !pattern.is_match(text)) }
}
