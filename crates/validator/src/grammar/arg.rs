//! Typed rule arguments.
//!
//! Every rule declares the [`ArgKind`] it expects. The raw JSON argument is
//! parsed into a [`RuleArg`] once, when the rule set is compiled, so a
//! non-numeric `min` or a broken `regex` is reported before any field is
//! checked.

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::dimension::DimensionSpec;
use crate::foundation::{ValidatorError, ValidatorResult};
use crate::messages::{format_date_time, format_number};

/// Shape of argument a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Any argument is ignored.
    None,
    /// Truthy switch; absent means `false`.
    Flag,
    Number,
    OptionalNumber,
    /// A required string, e.g. the field name for `same`.
    Text,
    /// A list of strings, as an array or a comma-separated string.
    List,
    OptionalList,
    /// An inclusive numeric interval.
    Range,
    Dimension,
    Pattern,
    DateFormat,
    DateReference,
    /// Passed through untouched.
    Any,
}

/// A parsed argument.
#[derive(Debug, Clone)]
pub enum RuleArg {
    None,
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Range(f64, f64),
    Dimension(DimensionSpec),
    Pattern(Regex),
    DateFormat(Option<DateFormat>),
    DateReference(DateReference),
    Raw(Value),
}

impl RuleArg {
    /// Parses `raw` as `kind` for the rule named `rule`.
    pub fn parse(kind: ArgKind, rule: &str, raw: Option<&Value>) -> ValidatorResult<Self> {
        let raw = raw.filter(|value| !value.is_null());
        match kind {
            ArgKind::None => Ok(Self::None),
            ArgKind::Flag => Ok(Self::Flag(raw.is_some_and(is_truthy))),
            ArgKind::Number => match raw {
                Some(value) => parse_number(rule, value).map(Self::Number),
                None => Err(ValidatorError::invalid_argument(rule, "expects a numeric argument")),
            },
            ArgKind::OptionalNumber => match raw {
                Some(value) => parse_number(rule, value).map(Self::Number),
                None => Ok(Self::None),
            },
            ArgKind::Text => match raw {
                Some(Value::String(text)) if !text.is_empty() => Ok(Self::Text(text.clone())),
                _ => Err(ValidatorError::invalid_argument(rule, "expects a non-empty string")),
            },
            ArgKind::List => match raw {
                Some(value) => parse_list(rule, value).map(Self::List),
                None => Err(ValidatorError::invalid_argument(rule, "expects a list of values")),
            },
            ArgKind::OptionalList => match raw {
                Some(value) => parse_list(rule, value).map(Self::List),
                None => Ok(Self::None),
            },
            ArgKind::Range => match raw {
                Some(value) => parse_range(rule, value),
                None => Err(ValidatorError::invalid_argument(rule, "expects a range like [1, 10]")),
            },
            ArgKind::Dimension => match raw {
                Some(value) => DimensionSpec::parse(value).map(Self::Dimension),
                None => Ok(Self::Dimension(DimensionSpec::default())),
            },
            ArgKind::Pattern => match raw {
                Some(Value::String(pattern)) => parse_pattern(rule, pattern).map(Self::Pattern),
                _ => Err(ValidatorError::invalid_argument(rule, "expects a pattern string")),
            },
            ArgKind::DateFormat => match raw {
                None => Ok(Self::DateFormat(None)),
                Some(Value::String(token)) if token.is_empty() => Ok(Self::DateFormat(None)),
                Some(Value::String(token)) => DateFormat::from_token(token)
                    .map(|format| Self::DateFormat(Some(format)))
                    .ok_or_else(|| {
                        ValidatorError::invalid_argument(
                            rule,
                            format!(
                                "unknown date format `{token}`, expected one of {}",
                                DateFormat::ALL.map(DateFormat::token).join(", ")
                            ),
                        )
                    }),
                Some(_) => Err(ValidatorError::invalid_argument(rule, "expects a date format token")),
            },
            ArgKind::DateReference => DateReference::parse(rule, raw).map(Self::DateReference),
            ArgKind::Any => Ok(raw.map_or(Self::None, |value| Self::Raw(value.clone()))),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// `true` for a set flag; `false` for anything else.
    pub fn flag(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    /// The text substituted for the `{rule}` token in the rule's message.
    pub fn placeholder(&self, now: NaiveDateTime) -> Option<String> {
        match self {
            Self::Number(value) => Some(format_number(*value)),
            Self::Text(text) => Some(text.clone()),
            Self::List(items) => Some(items.join(", ")),
            Self::Range(low, high) => Some(format!("{}, {}", format_number(*low), format_number(*high))),
            Self::Pattern(pattern) => Some(pattern.as_str().to_owned()),
            Self::DateFormat(format) => format.map(|format| format.token().to_owned()),
            Self::DateReference(reference) => reference.resolve(now).map(format_date_time),
            Self::Raw(Value::String(text)) => Some(text.clone()),
            Self::Raw(value) => Some(value.to_string()),
            Self::None | Self::Flag(_) | Self::Dimension(_) => None,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !matches!(text.trim(), "" | "0" | "false"),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn parse_number(rule: &str, value: &Value) -> ValidatorResult<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|number| number.is_finite())
        .ok_or_else(|| ValidatorError::NotANumber {
            rule: rule.to_owned(),
            value: match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        })
}

fn parse_list(rule: &str, value: &Value) -> ValidatorResult<Vec<String>> {
    match value {
        Value::Array(items) => Ok(items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect()),
        Value::String(text) => Ok(text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()),
        _ => Err(ValidatorError::invalid_argument(
            rule,
            "expects an array or a comma-separated string",
        )),
    }
}

fn parse_range(rule: &str, value: &Value) -> ValidatorResult<RuleArg> {
    let bounds = match value {
        Value::Array(items) if items.len() == 2 => {
            (parse_number(rule, &items[0])?, parse_number(rule, &items[1])?)
        }
        Value::String(text) => match text.split_once(',') {
            Some((low, high)) => (
                parse_number(rule, &Value::String(low.to_owned()))?,
                parse_number(rule, &Value::String(high.to_owned()))?,
            ),
            None => return Err(ValidatorError::invalid_argument(rule, "expects `low,high`")),
        },
        _ => return Err(ValidatorError::invalid_argument(rule, "expects a range like [1, 10]")),
    };
    if bounds.0 > bounds.1 {
        return Err(ValidatorError::invalid_argument(
            rule,
            format!("lower bound {} exceeds upper bound {}", bounds.0, bounds.1),
        ));
    }
    Ok(RuleArg::Range(bounds.0, bounds.1))
}

/// Compiles a pattern, accepting the `/body/flags` literal form.
fn parse_pattern(rule: &str, pattern: &str) -> ValidatorResult<Regex> {
    let (body, flags) = split_literal(pattern).unwrap_or((pattern, ""));
    RegexBuilder::new(body)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|err| ValidatorError::InvalidPattern {
            rule: rule.to_owned(),
            message: err.to_string(),
        })
}

fn split_literal(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let flags = &rest[end + 1..];
    flags
        .chars()
        .all(|flag| matches!(flag, 'g' | 'i' | 'm' | 's' | 'u' | 'y'))
        .then(|| (&rest[..end], flags))
}

// ============================================================================
// DATES
// ============================================================================

/// Accepted date layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `YYYY-DD-MM`, the default.
    #[default]
    YearDayMonth,
    /// `YYYY/DD/MM`
    YearDayMonthSlashed,
    /// `MM/DD/YYYY`
    MonthDayYear,
    /// `DD/MM/YYYY`
    DayMonthYear,
    /// `YYYY-MM-DD`
    YearMonthDay,
}

impl DateFormat {
    /// Every layout, in the order `dateAll` tries them.
    pub const ALL: [Self; 5] = [
        Self::YearDayMonth,
        Self::YearDayMonthSlashed,
        Self::MonthDayYear,
        Self::DayMonthYear,
        Self::YearMonthDay,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::YearDayMonth => "YYYY-DD-MM",
            Self::YearDayMonthSlashed => "YYYY/DD/MM",
            Self::MonthDayYear => "MM/DD/YYYY",
            Self::DayMonthYear => "DD/MM/YYYY",
            Self::YearMonthDay => "YYYY-MM-DD",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.token() == token)
    }
}

/// The cutoff a date is compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateReference {
    Now,
    /// Today at midnight, shifted by whole years; negative is the past.
    YearsFromToday(i32),
    Fixed(NaiveDateTime),
}

impl DateReference {
    fn parse(rule: &str, raw: Option<&Value>) -> ValidatorResult<Self> {
        let Some(value) = raw else {
            return Ok(Self::Now);
        };
        if let Value::String(text) = value {
            let text = text.trim();
            if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                return Ok(Self::Fixed(date.and_time(NaiveTime::MIN)));
            }
            for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(date_time) = NaiveDateTime::parse_from_str(text, layout) {
                    return Ok(Self::Fixed(date_time));
                }
            }
        }
        let years = parse_number(rule, value)?;
        if years.fract() != 0.0 || years.abs() > f64::from(i32::MAX / 12) {
            return Err(ValidatorError::invalid_argument(
                rule,
                format!("expects a whole number of years, got {years}"),
            ));
        }
        Ok(Self::YearsFromToday(years as i32))
    }

    /// The concrete cutoff relative to `now`.
    pub fn resolve(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Now => Some(now),
            Self::Fixed(date_time) => Some(date_time),
            Self::YearsFromToday(years) => {
                let months = Months::new(years.unsigned_abs() * 12);
                let today = now.date();
                let shifted = if years >= 0 {
                    today.checked_add_months(months)
                } else {
                    today.checked_sub_months(months)
                };
                shifted.map(|date| date.and_time(NaiveTime::MIN))
            }
        }
    }
}

// ============================================================================
// EXCLUSIVE GROUP
// ============================================================================

/// Argument of `only_any_of`: the participating fields and their rules.
///
/// Accepts `{"fields": {..}, "makeInvalidEmpty": true}` or the field map
/// directly, where a `makeInvalidEmpty` key is read as the flag rather than
/// as a field.
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusiveSpec {
    pub fields: IndexMap<String, Value>,
    pub make_invalid_empty: bool,
}

impl ExclusiveSpec {
    pub fn parse(rule: &str, raw: &Value) -> ValidatorResult<Self> {
        let Value::Object(object) = raw else {
            return Err(ValidatorError::invalid_argument(
                rule,
                "expects an object mapping field names to rules",
            ));
        };
        let make_invalid_empty = object.get("makeInvalidEmpty").is_some_and(is_truthy);
        let fields = match object.get("fields") {
            Some(Value::Object(fields)) => fields.clone(),
            Some(_) => {
                return Err(ValidatorError::invalid_argument(rule, "`fields` must be an object"));
            }
            None => object
                .iter()
                .filter(|(key, _)| key.as_str() != "makeInvalidEmpty")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };
        if fields.is_empty() {
            return Err(ValidatorError::invalid_argument(rule, "names no fields"));
        }
        Ok(Self {
            fields: fields.into_iter().collect(),
            make_invalid_empty,
        })
    }
}
