//! A validation session: compiled rules, data and the visible error map.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::pass::Pass;
use super::validator::Validator;
use crate::foundation::{
    ConditionalGroupResult, DateCache, EmptySource, FieldEvaluator, FieldLookup, FieldSource,
    FieldValue, FieldVerdict, GroupFailure, NoLookup, RunMode, ValidatorResult,
};
use crate::messages::{CustomMessages, MessageResolver};
use crate::registry::{CompiledRule, RuleList};

/// Staged participant messages: owner, then group rule, then participant.
pub type StagedErrors = IndexMap<String, IndexMap<String, IndexMap<String, String>>>;

// ============================================================================
// ERROR STATE
// ============================================================================

/// The visible error map plus the bookkeeping needed to rewrite it.
#[derive(Debug, Clone, Default)]
struct ErrorState {
    errors: IndexMap<String, String>,
    staged: StagedErrors,
    /// Fields each owner marked as must-be-empty, so a later pass of the
    /// owner can withdraw them.
    culprits: HashMap<String, Vec<String>>,
    /// Fields whose entry was written by a live group, keyed to that
    /// group's `(owner, rule)`.
    group_owned: HashMap<String, (String, String)>,
}

impl ErrorState {
    fn is_culprit(&self, field: &str) -> bool {
        self.culprits
            .values()
            .any(|fields| fields.iter().any(|culprit| culprit == field))
    }

    fn forget_culprit(&mut self, field: &str) {
        for fields in self.culprits.values_mut() {
            fields.retain(|culprit| culprit != field);
        }
    }

    /// Replaces the culprits `owner` marked last time with `marked`.
    fn set_culprits(&mut self, owner: &str, marked: Vec<(String, String)>) {
        if let Some(previous) = self.culprits.remove(owner) {
            for field in previous {
                if !marked.iter().any(|(culprit, _)| *culprit == field) && !self.is_culprit(&field) {
                    self.errors.shift_remove(&field);
                }
            }
        }
        if marked.is_empty() {
            return;
        }
        let names = marked.iter().map(|(field, _)| field.clone()).collect();
        for (field, message) in marked {
            self.errors.insert(field, message);
        }
        self.culprits.insert(owner.to_owned(), names);
    }

    fn stage(&mut self, owner: &str, rule: &str, group: &ConditionalGroupResult) {
        if group.per_subfield.is_empty() {
            if let Some(groups) = self.staged.get_mut(owner) {
                groups.shift_remove(rule);
            }
            return;
        }
        self.staged
            .entry(owner.to_owned())
            .or_default()
            .insert(rule.to_owned(), group.per_subfield.clone());
    }

    /// Takes back the entries the live group `(owner, rule)` wrote and
    /// returns the fields whose own rules must be re-checked.
    fn release_group(&mut self, owner: &str, rule: &str) -> Vec<String> {
        let released: Vec<String> = self
            .group_owned
            .iter()
            .filter(|(_, (by, kind))| by == owner && kind == rule)
            .map(|(field, _)| field.clone())
            .collect();
        for field in &released {
            self.group_owned.remove(field);
            self.errors.shift_remove(field);
        }
        released
    }

    /// Writes a field's own error, ending any live group's claim on it.
    fn insert_own(&mut self, field: &str, message: String) {
        self.group_owned.remove(field);
        self.errors.insert(field.to_owned(), message);
    }

    /// Rewrites the entries a top-level verdict for `field` is responsible for.
    fn apply(&mut self, field: &str, verdict: &FieldVerdict) {
        self.group_owned.remove(field);
        self.staged.shift_remove(field);
        let marked = verdict
            .must_be_empty()
            .map(|(culprit, message)| (culprit.to_owned(), message.to_owned()))
            .collect();
        self.set_culprits(field, marked);
        for (rule, group) in &verdict.groups {
            self.stage(field, rule, group);
        }

        match (&verdict.message, verdict.passed) {
            (Some(message), false) => {
                self.errors.insert(field.to_owned(), message.clone());
                self.forget_culprit(field);
            }
            _ if self.is_culprit(field) => {}
            _ => {
                self.errors.shift_remove(field);
            }
        }
    }

    /// Promotes one group re-evaluated because `listener` changed.
    ///
    /// Returns the fields the group let go of; their own rule lists decide
    /// what they show next.
    fn apply_live_group(
        &mut self,
        owner: &str,
        listener: &str,
        rule: &str,
        group: &ConditionalGroupResult,
        messages: MessageResolver<'_>,
    ) -> Vec<String> {
        self.stage(owner, rule, group);
        if group.passed {
            self.set_culprits(owner, Vec::new());
            let mut released = self.release_group(owner, rule);
            if self.errors.contains_key(owner) && !released.iter().any(|field| field == owner) {
                released.push(owner.to_owned());
            }
            return released;
        }
        if !group.must_be_empty.is_empty() {
            let marked = group
                .must_be_empty
                .iter()
                .map(|(field, message)| (field.clone(), message.clone()))
                .collect();
            let released = self.release_group(owner, rule);
            self.set_culprits(owner, marked);
            return released;
        }

        let key = match group.failure {
            Some(GroupFailure::MatchNone) => "matchNone",
            Some(GroupFailure::MatchMultiple) => "matchMultiple",
            _ => rule,
        };
        let message = messages
            .custom()
            .group_message(listener, rule, key)
            .map(str::to_owned)
            .or_else(|| group.per_subfield.get(listener).cloned())
            .or_else(|| group.aggregate_message.clone())
            .unwrap_or_else(|| messages.fallback().to_owned());
        self.errors.insert(listener.to_owned(), message);
        self.group_owned
            .insert(listener.to_owned(), (owner.to_owned(), rule.to_owned()));
        Vec::new()
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Rules, data and errors of one form.
///
/// Created by [`Validator::context`]; reusable across passes. Every pass
/// rewrites the entries of the fields it examined, so errors from earlier
/// passes never outlive a passing re-check.
pub struct ValidationContext {
    validator: Arc<Validator>,
    rules: Arc<IndexMap<String, RuleList>>,
    data: Arc<dyn FieldSource>,
    lookup: Arc<dyn FieldLookup>,
    messages: CustomMessages,
    state: ErrorState,
    dates: DateCache,
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("fields", &self.rules.keys().collect::<Vec<_>>())
            .field("errors", &self.state.errors)
            .finish_non_exhaustive()
    }
}

impl ValidationContext {
    pub(crate) fn new(validator: Arc<Validator>, rules: IndexMap<String, RuleList>) -> Self {
        Self {
            validator,
            rules: Arc::new(rules),
            data: Arc::new(EmptySource),
            lookup: Arc::new(NoLookup),
            messages: CustomMessages::new(),
            state: ErrorState::default(),
            dates: DateCache::default(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_data(mut self, data: impl FieldSource + 'static) -> Self {
        self.data = Arc::new(data);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_data(mut self, data: Arc<dyn FieldSource>) -> Self {
        self.data = data;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_lookup(mut self, lookup: impl FieldLookup + 'static) -> Self {
        self.lookup = Arc::new(lookup);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_lookup(mut self, lookup: Arc<dyn FieldLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_messages(mut self, messages: CustomMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Merges overrides into the current custom messages.
    pub fn set_error_messages(&mut self, messages: CustomMessages) {
        self.messages.merge(messages);
    }

    /// Replaces the data source for the next pass; errors are kept.
    pub fn set_data(&mut self, data: impl FieldSource + 'static) {
        self.data = Arc::new(data);
    }

    pub fn validator(&self) -> &Arc<Validator> {
        &self.validator
    }

    pub fn rules(&self) -> &IndexMap<String, RuleList> {
        &self.rules
    }

    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.state.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.state.errors.get(field).map(String::as_str)
    }

    /// `true` when no field currently shows an error.
    pub fn is_valid(&self) -> bool {
        self.state.errors.is_empty()
    }

    pub fn conditional_errors(&self) -> &StagedErrors {
        &self.state.staged
    }

    /// Message `rule` would record on `field` with the current overrides.
    pub fn error_message(&self, field: &str, rule: &str) -> String {
        resolver(&self.validator, &self.messages).error(field, rule)
    }

    // ------------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------------

    /// Evaluates `rules` for `field` over `values` and rewrites its entry.
    pub async fn verify(
        &mut self,
        field: &str,
        values: &[FieldValue],
        rules: &RuleList,
        mode: RunMode,
    ) -> ValidatorResult<bool> {
        let verdict = self.evaluate(field, values, rules, mode).await?;
        self.state.apply(field, &verdict);
        debug!(field = %field, passed = verdict.passed, errors = self.state.errors.len(), "field verified");
        Ok(verdict.passed)
    }

    async fn evaluate(
        &mut self,
        field: &str,
        values: &[FieldValue],
        rules: &RuleList,
        mode: RunMode,
    ) -> ValidatorResult<FieldVerdict> {
        self.dates.clear();
        let validator = Arc::clone(&self.validator);
        open_pass(&validator, &self.messages, &*self.data, &*self.lookup, &mut self.dates)
            .evaluate(field, values, rules, mode)
            .await
    }

    /// Verifies one declared field against the current data.
    ///
    /// Fields without declared rules pass.
    pub async fn verify_field(&mut self, field: &str) -> ValidatorResult<bool> {
        let rules = Arc::clone(&self.rules);
        let Some(list) = rules.get(field) else {
            return Ok(true);
        };
        let values = self.data.get_all(field);
        self.verify(field, &values, list, RunMode::ShortCircuit).await
    }

    /// Verifies every declared field; one failure does not stop the others.
    pub async fn verify_data(&mut self) -> ValidatorResult<bool> {
        let rules = Arc::clone(&self.rules);
        let mut all_passed = true;
        for field in rules.keys() {
            all_passed &= self.verify_field(field).await?;
        }
        debug!(fields = rules.len(), all_passed, "data verified");
        Ok(all_passed)
    }

    /// Swaps in `data` and verifies every field.
    pub async fn verify_data_with(&mut self, data: impl FieldSource + 'static) -> ValidatorResult<bool> {
        self.set_data(data);
        self.verify_data().await
    }

    /// Runs only `rule` from `field`'s list, e.g. `required` on blur.
    ///
    /// A pass only withdraws the error `rule` itself recorded; messages
    /// from the field's other rules stay.
    pub(crate) async fn verify_rule(&mut self, field: &str, rule: &str) -> ValidatorResult<bool> {
        let rules = Arc::clone(&self.rules);
        let Some(found) = rules.get(field).and_then(|list| list.find(rule)) else {
            return Ok(true);
        };
        let single: RuleList = std::iter::once(found.clone()).collect();
        let values = self.data.get_all(field);
        let verdict = self
            .evaluate(field, &values, &single, RunMode::ShortCircuit)
            .await?;
        if verdict.passed {
            let own = resolver(&self.validator, &self.messages).error(field, rule);
            if self.error(field) == Some(own.as_str()) {
                self.state.errors.shift_remove(field);
            }
        } else if let Some(message) = verdict.message {
            self.state.insert_own(field, message);
        }
        Ok(verdict.passed)
    }

    /// Re-evaluates `owner`'s groups that list `listener` and promotes the
    /// outcome onto the listener.
    pub(crate) async fn verify_group(&mut self, owner: &str, listener: &str) -> ValidatorResult<bool> {
        let rules = Arc::clone(&self.rules);
        let Some(list) = rules.get(owner) else {
            return Ok(true);
        };
        let single: RuleList = list
            .iter()
            .filter(|rule| match rule {
                CompiledRule::AnyOf(fields) | CompiledRule::OnlyAnyOf { fields, .. } => {
                    fields.contains_key(listener)
                }
                _ => false,
            })
            .cloned()
            .collect();
        if single.is_empty() {
            return Ok(true);
        }

        self.dates.clear();
        let values = self.data.get_all(owner);
        let validator = Arc::clone(&self.validator);
        let verdict = open_pass(&validator, &self.messages, &*self.data, &*self.lookup, &mut self.dates)
            .evaluate(owner, &values, &single, RunMode::ToCompletion)
            .await?;

        let messages = resolver(&validator, &self.messages);
        let mut released = Vec::new();
        for (rule, group) in &verdict.groups {
            released.extend(
                self.state
                    .apply_live_group(owner, listener, rule, group, messages),
            );
        }
        debug!(owner, listener, passed = verdict.passed, released = released.len(), "group re-evaluated");
        for field in released {
            self.verify_field(&field).await?;
        }
        Ok(verdict.passed)
    }
}

fn resolver<'a>(validator: &'a Validator, messages: &'a CustomMessages) -> MessageResolver<'a> {
    MessageResolver::new(
        validator.registry().catalog(),
        messages,
        &validator.config().fallback_message,
    )
}

fn open_pass<'a>(
    validator: &'a Validator,
    messages: &'a CustomMessages,
    data: &'a dyn FieldSource,
    lookup: &'a dyn FieldLookup,
    dates: &'a mut DateCache,
) -> Pass<'a> {
    Pass::new(
        validator.config(),
        validator.special_chars(),
        resolver(validator, messages),
        data,
        lookup,
        dates,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use crate::config::ValidatorConfig;

    fn context(rules: Value, data: Value) -> ValidationContext {
        let validator = Arc::new(Validator::new(ValidatorConfig::default()).unwrap());
        let Value::Object(data) = data else {
            unreachable!()
        };
        validator.context(&rules).unwrap().with_data(data)
    }

    #[tokio::test]
    async fn test_passing_recheck_clears_stale_error() {
        let mut ctx = context(json!({"name": "required|min:3"}), json!({"name": "ab"}));
        assert!(!ctx.verify_data().await.unwrap());
        assert_eq!(
            ctx.error("name"),
            Some("The field should contain a minimum of 3 characters.")
        );

        assert!(ctx.verify_data_with(json!({"name": "abc"}).as_object().cloned().unwrap()).await.unwrap());
        assert!(ctx.errors().is_empty());
        assert!(ctx.is_valid());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_other_fields() {
        let mut ctx = context(
            json!({"a": "required", "b": "email", "c": "numb"}),
            json!({"b": "nope", "c": "12"}),
        );
        assert!(!ctx.verify_data().await.unwrap());
        assert_eq!(
            ctx.errors().keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[tokio::test]
    async fn test_any_of_error_lands_on_owner_only() {
        let rules = json!({"contact": {"any_of": {"a": "required", "b": "required"}}});
        let mut ctx = context(rules.clone(), json!({}));
        assert!(!ctx.verify_data().await.unwrap());
        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.error("contact"), Some("This field is required."));
        assert_eq!(ctx.conditional_errors()["contact"]["any_of"].len(), 2);

        let mut ctx = context(rules, json!({"b": "x"}));
        assert!(ctx.verify_data().await.unwrap());
        assert!(ctx.errors().is_empty());
    }

    #[tokio::test]
    async fn test_short_circuit_drops_staged_group_errors() {
        let rules = json!({"contact": ["required", {"any_of": {"a": "required", "b": "required"}}]});
        let mut ctx = context(rules, json!({"contact": "x"}));
        assert!(!ctx.verify_data().await.unwrap());
        assert!(ctx.conditional_errors()["contact"].contains_key("any_of"));

        assert!(!ctx.verify_data_with(json!({}).as_object().cloned().unwrap()).await.unwrap());
        assert_eq!(ctx.error("contact"), Some("This field is required."));
        assert!(!ctx.conditional_errors().contains_key("contact"));
    }

    #[tokio::test]
    async fn test_make_invalid_empty_marks_culprits_then_withdraws() {
        let rules = json!({"pay": {"only_any_of": {
            "fields": {"card": "numb", "iban": "alphaNumeric"},
            "makeInvalidEmpty": true
        }}});
        let mut ctx = context(rules, json!({"card": "4111", "iban": "DE-89"}));
        assert!(!ctx.verify_data().await.unwrap());
        assert_eq!(ctx.error("iban"), Some("Please make this field empty."));
        assert!(ctx.error("pay").is_none());

        let data = json!({"card": "4111", "iban": ""});
        assert!(ctx.verify_data_with(data.as_object().cloned().unwrap()).await.unwrap());
        assert!(ctx.errors().is_empty());
    }

    #[tokio::test]
    async fn test_set_error_messages_merges() {
        let mut ctx = context(json!({"name": "required"}), json!({}))
            .with_messages(CustomMessages::from_value(json!({"name": {"min": "short"}})));
        ctx.set_error_messages(CustomMessages::from_value(json!({"name_required": "Name please"})));
        assert_eq!(ctx.error_message("name", "min"), "short");
        ctx.verify_data().await.unwrap();
        assert_eq!(ctx.error("name"), Some("Name please"));
    }
}
