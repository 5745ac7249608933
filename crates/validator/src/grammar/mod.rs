//! Rule grammar.
//!
//! A field's rules are declared in one of three shapes:
//!
//! ```text
//! "required|min:4|max:20"                    pipe-delimited string
//! ["required", {"min": 4}, "max:20"]         ordered list of items
//! {"dimension": {"square": 0}}               a single rule object
//! ```
//!
//! All three normalize to an ordered list of [`AtomicRule`]s. Arguments stay
//! raw JSON here; typed parsing happens per rule in [`RuleArg::parse`].

mod arg;
mod dimension;

pub use arg::{ArgKind, DateFormat, DateReference, ExclusiveSpec, RuleArg};
pub use dimension::{DimensionCheck, DimensionOutcome, DimensionSpec};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::foundation::{ValidatorError, ValidatorResult};

/// A rule name paired with its raw argument.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicRule {
    pub name: String,
    pub arg: Option<Value>,
}

impl AtomicRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg: None,
        }
    }

    pub fn with_arg(name: impl Into<String>, arg: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            arg: Some(arg.into()),
        }
    }

    /// The list-item form this rule resolves back from.
    pub fn to_value(&self) -> Value {
        match &self.arg {
            None if !self.name.contains(':') => Value::String(self.name.clone()),
            arg => {
                let mut object = Map::with_capacity(1);
                object.insert(self.name.clone(), arg.clone().unwrap_or(Value::Null));
                Value::Object(object)
            }
        }
    }
}

/// A field's rule declaration as written by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Pipe(String),
    List(Vec<Value>),
    Single(Map<String, Value>),
}

impl RuleSpec {
    /// Normalizes into an ordered rule list.
    pub fn resolve(&self) -> ValidatorResult<Vec<AtomicRule>> {
        match self {
            Self::Pipe(text) => Ok(split_pipe(text)),
            Self::List(items) => items.iter().map(resolve_sub_rule).collect(),
            Self::Single(object) => Ok(vec![resolve_object(object)?]),
        }
    }
}

impl From<Vec<AtomicRule>> for RuleSpec {
    fn from(rules: Vec<AtomicRule>) -> Self {
        Self::List(rules.iter().map(AtomicRule::to_value).collect())
    }
}

impl From<&str> for RuleSpec {
    fn from(text: &str) -> Self {
        Self::Pipe(text.to_owned())
    }
}

/// Resolves any JSON rule declaration.
///
/// Strings split on `|`, arrays resolve item by item without further
/// splitting, and an object becomes a one-rule list. Anything else is a
/// [`ValidatorError::MalformedSpec`].
pub fn resolve_rule(spec: &Value) -> ValidatorResult<Vec<AtomicRule>> {
    match spec {
        Value::String(text) => Ok(split_pipe(text)),
        Value::Array(items) => items.iter().map(resolve_sub_rule).collect(),
        Value::Object(object) => Ok(vec![resolve_object(object)?]),
        other => Err(ValidatorError::malformed(format!(
            "rules must be a string, an array or a single-rule object, got {}",
            json_kind(other)
        ))),
    }
}

/// Resolves one list item: `"name"`, `"name:arg"` or `{"name": arg}`.
///
/// The argument of the string form is kept as a string even when it looks
/// numeric; rules coerce it themselves.
pub fn resolve_sub_rule(item: &Value) -> ValidatorResult<AtomicRule> {
    match item {
        Value::String(text) => Ok(split_colon(text)),
        Value::Object(object) => resolve_object(object),
        other => Err(ValidatorError::malformed(format!(
            "a rule item must be a string or an object, got {}",
            json_kind(other)
        ))),
    }
}

fn split_pipe(text: &str) -> Vec<AtomicRule> {
    text.split('|')
        .filter(|segment| !segment.is_empty())
        .map(split_colon)
        .collect()
}

fn split_colon(text: &str) -> AtomicRule {
    match text.split_once(':') {
        Some((name, arg)) => AtomicRule::with_arg(name, arg),
        None => AtomicRule::new(text),
    }
}

fn resolve_object(object: &Map<String, Value>) -> ValidatorResult<AtomicRule> {
    let mut entries = object.iter();
    match (entries.next(), entries.next()) {
        (Some((name, arg)), None) => Ok(AtomicRule {
            name: name.clone(),
            arg: (!arg.is_null()).then(|| arg.clone()),
        }),
        (None, _) => Err(ValidatorError::malformed("a rule object must name a rule")),
        (Some(_), Some(_)) => Err(ValidatorError::malformed(format!(
            "a rule object holds exactly one rule, got {} keys",
            object.len()
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(rules: &[AtomicRule]) -> Vec<&str> {
        rules.iter().map(|rule| rule.name.as_str()).collect()
    }

    #[test]
    fn test_pipe_string() {
        let rules = resolve_rule(&json!("required|min:4|max:20")).unwrap();
        assert_eq!(names(&rules), vec!["required", "min", "max"]);
        assert_eq!(rules[1].arg, Some(json!("4")));
        assert_eq!(rules[0].arg, None);
    }

    #[test]
    fn test_pipe_string_skips_empty_segments() {
        let rules = resolve_rule(&json!("required||email|")).unwrap();
        assert_eq!(names(&rules), vec!["required", "email"]);
        assert!(resolve_rule(&json!("")).unwrap().is_empty());
    }

    #[test]
    fn test_colon_splits_once() {
        let rule = resolve_sub_rule(&json!("regex:^a:b$")).unwrap();
        assert_eq!(rule.name, "regex");
        assert_eq!(rule.arg, Some(json!("^a:b$")));
    }

    #[test]
    fn test_list_is_not_pipe_split() {
        let rules = resolve_rule(&json!(["required", {"min": 4}, "regex:a|b"])).unwrap();
        assert_eq!(names(&rules), vec!["required", "min", "regex"]);
        assert_eq!(rules[1].arg, Some(json!(4)));
        assert_eq!(rules[2].arg, Some(json!("a|b")));
    }

    #[test]
    fn test_single_object() {
        let rules = resolve_rule(&json!({"dimension": {"square": 0}})).unwrap();
        assert_eq!(rules, vec![AtomicRule::with_arg("dimension", json!({"square": 0}))]);
    }

    #[test]
    fn test_malformed_shapes() {
        for spec in [json!(5), json!(null), json!(true)] {
            let err = resolve_rule(&spec).unwrap_err();
            assert_eq!(err.code(), "RULE_MALFORMED_SPEC");
        }
        assert!(resolve_rule(&json!([["required"]])).is_err());
        assert!(resolve_rule(&json!([42])).is_err());
        assert!(resolve_rule(&json!({"min": 1, "max": 2})).is_err());
        assert!(resolve_rule(&json!({})).is_err());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let spec = json!(["required", {"min": "4"}, "max:9", {"any_of": {"a": "email"}}]);
        let once = resolve_rule(&spec).unwrap();
        let twice = RuleSpec::from(once.clone()).resolve().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rule_spec_deserializes_every_shape() {
        let pipe: RuleSpec = serde_json::from_value(json!("required|email")).unwrap();
        assert!(matches!(pipe, RuleSpec::Pipe(_)));
        let list: RuleSpec = serde_json::from_value(json!(["required"])).unwrap();
        assert!(matches!(list, RuleSpec::List(_)));
        let single: RuleSpec = serde_json::from_value(json!({"min": 3})).unwrap();
        assert_eq!(single.resolve().unwrap()[0].arg, Some(json!(3)));
    }
}
