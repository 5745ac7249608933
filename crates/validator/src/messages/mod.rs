//! Error messages: default templates, caller overrides and formatting.
//!
//! Resolution order for a failing rule on a field is always the same:
//!
//! 1. a custom message keyed by field and rule (`{"email": {"required": ".."}}`
//!    or the flat `"email_required"` form),
//! 2. the default template for the rule in the [`MessageCatalog`],
//! 3. the configured fallback message.
//!
//! Templates carry `{placeholder}` tokens that [`str_replace`] fills in.

mod catalog;

pub use catalog::{DEFAULT_MESSAGES, MessageCatalog};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// CUSTOM MESSAGES
// ============================================================================

/// Caller-supplied message overrides, keyed by field name.
///
/// Values are either nested objects (`{"field": {"rule": "msg"}}`) or flat
/// strings under `"field_rule"`. Dimension sub-checks nest one level deeper,
/// `{"field": {"dimension": {"square": "msg"}}}`, or use the flat
/// `"field_dimension_square"` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomMessages(Map<String, Value>);

impl CustomMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a JSON object; any other value yields no overrides.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges `other` into `self`. Nested objects merge key by key; anything
    /// else in `other` replaces the existing entry.
    pub fn merge(&mut self, other: Self) {
        for (key, value) in other.0 {
            match (self.0.get_mut(&key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    existing.extend(incoming);
                }
                (_, value) => {
                    self.0.insert(key, value);
                }
            }
        }
    }

    /// Raw override for `field` and `rule`; nested form wins over flat.
    pub fn entry(&self, field: &str, rule: &str) -> Option<&Value> {
        self.0
            .get(field)
            .and_then(|nested| nested.get(rule))
            .or_else(|| self.0.get(&format!("{field}_{rule}")))
    }

    /// Override string for `field` and `rule`.
    pub fn message(&self, field: &str, rule: &str) -> Option<&str> {
        self.entry(field, rule).and_then(Value::as_str)
    }

    /// Override for a dimension sub-check such as `square` or `width`.
    pub fn dimension(&self, field: &str, subcheck: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|nested| nested.get("dimension"))
            .and_then(|dimension| dimension.get(subcheck))
            .and_then(Value::as_str)
            .or_else(|| {
                self.0
                    .get(&format!("{field}_dimension_{subcheck}"))
                    .and_then(Value::as_str)
            })
    }

    /// Override for one outcome of a conditional group, e.g. `matchNone`
    /// under `only_any_of`. A plain string under the group name applies to
    /// every outcome.
    pub fn group_message(&self, field: &str, rule: &str, key: &str) -> Option<&str> {
        match self.entry(field, rule)? {
            Value::String(message) => Some(message),
            Value::Object(outcomes) => outcomes.get(key).and_then(Value::as_str),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for CustomMessages {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Read-only view combining the catalog, overrides and fallback.
#[derive(Debug, Clone, Copy)]
pub struct MessageResolver<'a> {
    catalog: &'a MessageCatalog,
    custom: &'a CustomMessages,
    fallback: &'a str,
}

impl<'a> MessageResolver<'a> {
    pub fn new(catalog: &'a MessageCatalog, custom: &'a CustomMessages, fallback: &'a str) -> Self {
        Self {
            catalog,
            custom,
            fallback,
        }
    }

    pub fn custom(&self) -> &'a CustomMessages {
        self.custom
    }

    pub fn catalog(&self) -> &'a MessageCatalog {
        self.catalog
    }

    /// Untemplated message for `field` failing `rule`.
    pub fn error(&self, field: &str, rule: &str) -> String {
        self.custom
            .message(field, rule)
            .or_else(|| self.catalog.get(rule))
            .unwrap_or(self.fallback)
            .to_owned()
    }

    /// Message for `rule`, with its `{rule}` token replaced by `placeholder`.
    pub fn rule_error(&self, field: &str, rule: &str, placeholder: Option<&str>) -> String {
        let message = self.error(field, rule);
        match placeholder {
            Some(value) => str_replace(&message, &[(rule, value)]),
            None => message,
        }
    }

    /// Message looked up under `key` (a rule or sub-check name) with every
    /// `(token, value)` pair substituted.
    pub fn templated(&self, field: &str, key: &str, subs: &[(&str, &str)]) -> String {
        str_replace(&self.error(field, key), subs)
    }

    /// Message for a failed `dimension` sub-check.
    pub fn dimension(&self, field: &str, subcheck: &str, subs: &[(&str, &str)]) -> String {
        let template = self
            .custom
            .dimension(field, subcheck)
            .or_else(|| self.catalog.get(&format!("dimension_{subcheck}")))
            .unwrap_or(self.fallback);
        str_replace(template, subs)
    }

    /// Catalog template for `key`, skipping overrides.
    pub fn catalog_or_fallback(&self, key: &str) -> String {
        self.catalog.get(key).unwrap_or(self.fallback).to_owned()
    }

    pub fn fallback(&self) -> &'a str {
        self.fallback
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Replaces the first `{token}` of each pair in `template`.
pub fn str_replace(template: &str, subs: &[(&str, &str)]) -> String {
    replace_tokens(template, subs, true)
}

/// Replaces the first occurrence of each token, in order; `use_braces`
/// selects `{token}` over the bare token.
pub fn replace_tokens(template: &str, subs: &[(&str, &str)], use_braces: bool) -> String {
    let mut out = template.to_owned();
    for (token, value) in subs {
        out = if use_braces {
            out.replacen(&format!("{{{token}}}"), value, 1)
        } else {
            out.replacen(token, value, 1)
        };
    }
    out
}

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// Human readable size: `512 bytes`, `1 kb`, `1.50 mb`, `2 gb`, `3.25 TB`.
pub fn human_file_size(size: u64) -> String {
    let (unit, label) = match size {
        s if s < KB => return format!("{s} bytes"),
        s if s < MB => (KB, "kb"),
        s if s < GB => (MB, "mb"),
        s if s < TB => (GB, "gb"),
        _ => (TB, "TB"),
    };
    if size % unit == 0 {
        format!("{} {label}", size / unit)
    } else {
        format!("{:.2} {label}", size as f64 / unit as f64)
    }
}

/// Date and time as shown in `tillDate` messages: `5 March,2020 by 4:07 pm`.
pub fn format_date_time(date: NaiveDateTime) -> String {
    date.format("%-d %B,%Y by %-I:%M %P").to_string()
}

/// Renders a number without a trailing `.0` when it is whole.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn custom(value: Value) -> CustomMessages {
        CustomMessages::from_value(value)
    }

    #[test]
    fn test_str_replace_first_occurrence_only() {
        assert_eq!(str_replace("{min} and {min}", &[("min", "3")]), "3 and {min}");
        assert_eq!(
            str_replace("{num1} to {num2}", &[("num1", "1"), ("num2", "9")]),
            "1 to 9"
        );
        assert_eq!(str_replace("no tokens", &[("min", "3")]), "no tokens");
    }

    #[test]
    fn test_replace_tokens_without_braces() {
        assert_eq!(replace_tokens("min is min", &[("min", "3")], false), "3 is min");
        assert_eq!(replace_tokens("{min} chars", &[("min", "3")], false), "{3} chars");
        assert_eq!(replace_tokens("{min} chars", &[("min", "3")], true), "3 chars");
    }

    #[test]
    fn test_human_file_size() {
        assert_eq!(human_file_size(512), "512 bytes");
        assert_eq!(human_file_size(1024), "1 kb");
        assert_eq!(human_file_size(1536), "1.50 kb");
        assert_eq!(human_file_size(2 * 1024 * 1024), "2 mb");
        assert_eq!(human_file_size(3 * GB), "3 gb");
        assert_eq!(human_file_size(TB + TB / 4), "1.25 TB");
    }

    #[test]
    fn test_format_date_time() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_date_time(date), "5 March,2020 by 12:00 am");

        let afternoon = NaiveDate::from_ymd_opt(2021, 12, 25)
            .unwrap()
            .and_hms_opt(16, 7, 0)
            .unwrap();
        assert_eq!(format_date_time(afternoon), "25 December,2021 by 4:07 pm");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_custom_lookup_nested_then_flat() {
        let messages = custom(json!({
            "email": {"required": "Email please"},
            "email_min": "Too short",
            "name_required": "Name please",
        }));
        assert_eq!(messages.message("email", "required"), Some("Email please"));
        assert_eq!(messages.message("email", "min"), Some("Too short"));
        assert_eq!(messages.message("name", "required"), Some("Name please"));
        assert_eq!(messages.message("name", "min"), None);
    }

    #[test]
    fn test_dimension_and_group_overrides() {
        let messages = custom(json!({
            "avatar": {"dimension": {"square": "Square only"}},
            "banner_dimension_width": "Wrong width",
            "phone": {"only_any_of": {"matchNone": "Give one"}},
            "fax": {"only_any_of": "Any failure"},
        }));
        assert_eq!(messages.dimension("avatar", "square"), Some("Square only"));
        assert_eq!(messages.dimension("banner", "width"), Some("Wrong width"));
        assert_eq!(messages.group_message("phone", "only_any_of", "matchNone"), Some("Give one"));
        assert_eq!(messages.group_message("phone", "only_any_of", "matchMultiple"), None);
        assert_eq!(messages.group_message("fax", "only_any_of", "matchMultiple"), Some("Any failure"));
    }

    #[test]
    fn test_merge_nested() {
        let mut messages = custom(json!({"email": {"required": "a"}, "x": "1"}));
        messages.merge(custom(json!({"email": {"min": "b"}, "x": "2"})));
        assert_eq!(messages.message("email", "required"), Some("a"));
        assert_eq!(messages.message("email", "min"), Some("b"));
        assert_eq!(messages.0.get("x"), Some(&json!("2")));
    }

    #[test]
    fn test_resolver_order() {
        let catalog = MessageCatalog::default();
        let overrides = custom(json!({"age": {"min": "At least {min}!"}}));
        let resolver = MessageResolver::new(&catalog, &overrides, "fallback");

        assert_eq!(resolver.rule_error("age", "min", Some("3")), "At least 3!");
        assert_eq!(
            resolver.rule_error("name", "min", Some("3")),
            "The field should contain a minimum of 3 characters."
        );
        assert_eq!(resolver.error("name", "frobnicate"), "fallback");
        assert_eq!(
            resolver.dimension("pic", "width", &[("width", "80")]),
            "The expected width for this image is 80px."
        );
    }
}
