//! One evaluation pass over compiled rule lists.

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, trace};

use crate::combinators;
use crate::config::ValidatorConfig;
use crate::foundation::{
    DateCache, FieldEvaluator, FieldLookup, FieldSource, FieldValue, FieldVerdict, Input, Outcome,
    RuleContext, RunMode, ValidatorResult, is_blank,
};
use crate::messages::MessageResolver;
use crate::registry::{AtomicCheck, CompiledRule, RuleList};

/// Borrowed state for evaluating fields against one data snapshot.
///
/// A pass never touches the visible error map; it only produces verdicts.
pub struct Pass<'a> {
    config: &'a ValidatorConfig,
    special_chars: &'a Regex,
    messages: MessageResolver<'a>,
    data: &'a dyn FieldSource,
    lookup: &'a dyn FieldLookup,
    dates: &'a mut DateCache,
}

impl<'a> Pass<'a> {
    pub fn new(
        config: &'a ValidatorConfig,
        special_chars: &'a Regex,
        messages: MessageResolver<'a>,
        data: &'a dyn FieldSource,
        lookup: &'a dyn FieldLookup,
        dates: &'a mut DateCache,
    ) -> Self {
        Self {
            config,
            special_chars,
            messages,
            data,
            lookup,
            dates,
        }
    }

    /// Runs one atomic rule over every element; the first failing element
    /// decides the message.
    async fn run_atomic(
        &mut self,
        field: &str,
        values: &[FieldValue],
        check: &AtomicCheck,
    ) -> ValidatorResult<Option<String>> {
        let inputs: Vec<Input<'_>> = if values.is_empty() {
            vec![Input::Absent]
        } else {
            values.iter().map(FieldValue::as_input).collect()
        };

        for input in inputs {
            if input.is_empty() && !check.rule.checks_empty() {
                continue;
            }
            let mut cx = RuleContext {
                field,
                rule: &check.name,
                config: self.config,
                special_chars: self.special_chars,
                messages: self.messages,
                data: self.data,
                lookup: self.lookup,
                dates: &mut *self.dates,
            };
            let outcome = check.rule.check(input, &check.arg, &mut cx).await?;
            trace!(field = %field, rule = %check.name, ?outcome, "rule evaluated");
            match outcome {
                Outcome::Passed => {}
                Outcome::Failed => {
                    let placeholder = check.arg.placeholder(self.config.now());
                    return Ok(Some(self.messages.rule_error(
                        field,
                        &check.name,
                        placeholder.as_deref(),
                    )));
                }
                Outcome::Reported(message) => return Ok(Some(message)),
            }
        }
        Ok(None)
    }

    async fn run_rules(
        &mut self,
        field: &str,
        values: &[FieldValue],
        rules: &RuleList,
        mode: RunMode,
    ) -> ValidatorResult<FieldVerdict> {
        let blank = is_blank(values);
        let mut verdict = FieldVerdict::pass();

        for rule in rules {
            let failure = match rule {
                CompiledRule::Atomic(check) => self.run_atomic(field, values, check).await?.map(Some),
                CompiledRule::AnyOf(fields) => {
                    let group = combinators::any_of(self, field, fields).await?;
                    record_group(&mut verdict, rule.name(), group)
                }
                CompiledRule::OnlyAnyOf {
                    fields,
                    make_invalid_empty,
                } => {
                    let group =
                        combinators::only_any_of(self, field, fields, *make_invalid_empty).await?;
                    record_group(&mut verdict, rule.name(), group)
                }
                // Value-level groups skip blank fields like any shape rule.
                CompiledRule::AnyOfRules(_) | CompiledRule::Not(_) if blank => None,
                CompiledRule::AnyOfRules(alternatives) => {
                    let group = combinators::any_of_rules(self, field, values, alternatives).await?;
                    record_group(&mut verdict, rule.name(), group)
                }
                CompiledRule::Not(nested) => {
                    let group = combinators::not_rule(self, field, values, nested).await?;
                    record_group(&mut verdict, rule.name(), group)
                }
            };

            let Some(message) = failure else {
                continue;
            };
            if verdict.passed {
                verdict.passed = false;
                verdict.failed_rule = Some(rule.name().to_owned());
                verdict.message = message;
            }
            if mode == RunMode::ShortCircuit {
                break;
            }
        }
        Ok(verdict)
    }
}

/// Stores a group result on the verdict and returns its failure, if any.
///
/// The outer option is "did it fail"; the inner one is the owner's message,
/// absent when only culprit fields are to be marked.
fn record_group(
    verdict: &mut FieldVerdict,
    rule: &str,
    group: combinators::ConditionalGroupResult,
) -> Option<Option<String>> {
    let failure = (!group.passed).then(|| group.aggregate_message.clone());
    verdict.groups.push((rule.to_owned(), group));
    failure
}

#[async_trait]
impl FieldEvaluator for Pass<'_> {
    fn values(&self, field: &str) -> Vec<FieldValue> {
        self.data.get_all(field)
    }

    fn is_filled(&self, field: &str) -> bool {
        !is_blank(&self.data.get_all(field)) || self.lookup.selected_files(field) > 0
    }

    fn messages(&self) -> MessageResolver<'_> {
        self.messages
    }

    fn reset_field(&mut self, field: &str) {
        self.dates.remove(field);
    }

    async fn evaluate(
        &mut self,
        field: &str,
        values: &[FieldValue],
        rules: &RuleList,
        mode: RunMode,
    ) -> ValidatorResult<FieldVerdict> {
        let verdict = match rules.find("accept") {
            // An unchecked checkbox submits nothing; only `accept` can judge it.
            Some(CompiledRule::Atomic(accept)) if is_blank(values) => {
                match self.run_atomic(field, &[], accept).await? {
                    None => FieldVerdict::pass(),
                    Some(message) => FieldVerdict::fail("accept", Some(message)),
                }
            }
            _ => self.run_rules(field, values, rules, mode).await?,
        };
        debug!(
            field = %field,
            passed = verdict.passed,
            failed_rule = verdict.failed_rule.as_deref(),
            "field evaluated"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::combinators::testing::Fixture;
    use crate::foundation::GroupFailure;

    async fn verdict(data: serde_json::Value, field: &str, rules: serde_json::Value) -> FieldVerdict {
        let mut fixture = Fixture::new(data);
        let rules = fixture.compile(rules);
        let mut pass = fixture.pass();
        let values = pass.values(field);
        pass.evaluate(field, &values, &rules, RunMode::ShortCircuit)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_short_circuit_reports_first_failure() {
        let verdict = verdict(json!({"name": "a1"}), "name", json!("alpha|min:3")).await;
        assert!(!verdict.passed);
        assert_eq!(verdict.failed_rule.as_deref(), Some("alpha"));
        assert_eq!(
            verdict.message.as_deref(),
            Some("This field may only contain alphabetic characters.")
        );
    }

    #[tokio::test]
    async fn test_empty_value_skips_shape_rules() {
        let verdict = verdict(json!({"name": "  "}), "name", json!("alpha|min:3|email|notRule:numb")).await;
        assert!(verdict.passed);

        let required = self::verdict(json!({}), "name", json!("min:3|required")).await;
        assert_eq!(required.failed_rule.as_deref(), Some("required"));
        assert_eq!(required.message.as_deref(), Some("This field is required."));
    }

    #[tokio::test]
    async fn test_every_element_is_checked() {
        let verdict = verdict(json!({"tags": ["rust", "go", "x"]}), "tags", json!("min:2")).await;
        assert!(!verdict.passed);
        assert_eq!(
            verdict.message.as_deref(),
            Some("The field should contain a minimum of 2 characters.")
        );
    }

    #[tokio::test]
    async fn test_to_completion_keeps_first_message() {
        let mut fixture = Fixture::new(json!({"pin": "ab"}));
        let rules = fixture.compile(json!("numb|min:4"));
        let mut pass = fixture.pass();
        let values = pass.values("pin");
        let verdict = pass
            .evaluate("pin", &values, &rules, RunMode::ToCompletion)
            .await
            .unwrap();
        assert_eq!(verdict.failed_rule.as_deref(), Some("numb"));
    }

    #[tokio::test]
    async fn test_blank_checkbox_only_runs_accept() {
        let verdict = verdict(json!({}), "terms", json!("required|accept")).await;
        assert_eq!(verdict.failed_rule.as_deref(), Some("accept"));
        assert_eq!(verdict.message.as_deref(), Some("Please check this checkbox."));
    }

    #[tokio::test]
    async fn test_atomic_and_group_failures_share_one_verdict() {
        let mut fixture = Fixture::new(json!({"contact": "x"}));
        let rules = fixture.compile(json!(["min:2", {"any_of": {"a": "required", "b": "required"}}]));
        let mut pass = fixture.pass();
        let values = pass.values("contact");
        let verdict = pass
            .evaluate("contact", &values, &rules, RunMode::ToCompletion)
            .await
            .unwrap();
        assert_eq!(verdict.failed_rule.as_deref(), Some("min"));
        assert_eq!(
            verdict.message.as_deref(),
            Some("The field should contain a minimum of 2 characters.")
        );
        assert_eq!(verdict.groups.len(), 1);
        assert!(!verdict.groups[0].1.passed);
    }

    #[tokio::test]
    async fn test_group_results_are_recorded() {
        let verdict = verdict(
            json!({"a": "1", "b": "2"}),
            "a",
            json!({"only_any_of": {"a": "numb", "b": "numb"}}),
        )
        .await;
        assert!(!verdict.passed);
        assert_eq!(verdict.groups.len(), 1);
        assert_eq!(verdict.groups[0].1.failure, Some(GroupFailure::MatchMultiple));
    }
}
