//! Per-rule evaluation context.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::warn;

use super::outcome::Outcome;
use super::value::{FieldLookup, FieldSource, Input};
use crate::config::ValidatorConfig;
use crate::messages::{MessageResolver, str_replace};

/// A date a date-shape rule parsed for a field, with the time of day when
/// `dateTime` matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedDate {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl CachedDate {
    pub fn to_date_time(self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }
}

/// Parsed dates keyed by field, so `tillDate` and `shouldOld` reuse the
/// exact reading `date` / `dateAll` / `dateTime` accepted.
#[derive(Debug, Clone, Default)]
pub struct DateCache {
    entries: HashMap<String, CachedDate>,
}

impl DateCache {
    pub fn get(&self, field: &str) -> Option<CachedDate> {
        self.entries.get(field).copied()
    }

    pub fn insert(&mut self, field: &str, date: NaiveDate) {
        self.entries
            .insert(field.to_owned(), CachedDate { date, time: None });
    }

    pub fn set_time(&mut self, field: &str, time: NaiveTime) {
        if let Some(cached) = self.entries.get_mut(field) {
            cached.time = Some(time);
        }
    }

    pub fn remove(&mut self, field: &str) {
        self.entries.remove(field);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything a rule may consult besides its own input and argument.
pub struct RuleContext<'a> {
    pub(crate) field: &'a str,
    pub(crate) rule: &'a str,
    pub(crate) config: &'a ValidatorConfig,
    pub(crate) special_chars: &'a Regex,
    pub(crate) messages: MessageResolver<'a>,
    pub(crate) data: &'a dyn FieldSource,
    pub(crate) lookup: &'a dyn FieldLookup,
    pub(crate) dates: &'a mut DateCache,
}

impl RuleContext<'_> {
    /// Name of the field under validation.
    pub fn field(&self) -> &str {
        self.field
    }

    /// Name the running rule was invoked under.
    pub fn rule(&self) -> &str {
        self.rule
    }

    pub fn config(&self) -> &ValidatorConfig {
        self.config
    }

    pub fn special_chars(&self) -> &Regex {
        self.special_chars
    }

    pub fn messages(&self) -> MessageResolver<'_> {
        self.messages
    }

    pub fn lookup(&self) -> &dyn FieldLookup {
        self.lookup
    }

    pub fn now(&self) -> NaiveDateTime {
        self.config.now()
    }

    pub fn dates(&mut self) -> &mut DateCache {
        self.dates
    }

    pub fn cached_date(&self) -> Option<CachedDate> {
        self.dates.get(self.field)
    }

    /// Text of another field: the data source first, then the live form.
    pub fn other_text(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(|value| value.as_text().map(str::to_owned))
            .or_else(|| self.lookup.raw_value(key))
    }

    /// Fails with the message stored under `key`.
    ///
    /// Lookup order: override for `key`, override for the running rule,
    /// default template for `key`, fallback.
    pub fn report(&self, key: &str, subs: &[(&str, &str)]) -> Outcome {
        let custom = self.messages.custom();
        let template = custom
            .message(self.field, key)
            .or_else(|| custom.message(self.field, self.rule))
            .or_else(|| self.messages.catalog().get(key))
            .unwrap_or(self.messages.fallback());
        Outcome::Reported(str_replace(template, subs))
    }

    /// Passes a non-text input given to a text-only rule.
    pub fn skip_non_text(&self, input: Input<'_>) -> Outcome {
        warn!(
            field = %self.field,
            rule = self.rule,
            kind = input.kind(),
            "text rule applied to a non-text value, skipping"
        );
        Outcome::Passed
    }
}
