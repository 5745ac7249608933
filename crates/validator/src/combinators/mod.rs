//!
//! Conditional rules
//! Groups that decide a field's validity from other fields or from
//! alternative rule lists. Each group runs against a [`FieldEvaluator`] and
//! returns a [`ConditionalGroupResult`]; the caller decides which messages
//! become visible.
pub mod any_of;
pub mod any_of_rules;
pub mod not;
pub mod only_any_of;

pub use any_of::any_of;
pub use any_of_rules::any_of_rules;
pub use not::not_rule;
pub use only_any_of::only_any_of;

pub use crate::foundation::{ConditionalGroupResult, FieldEvaluator, GroupFailure};

use indexmap::IndexMap;

use crate::foundation::{RunMode, ValidatorResult};
use crate::messages::MessageResolver;
use crate::registry::RuleList;

/// Evaluates one participant of a field group afresh.
///
/// Returns whether it satisfies the group and its failure message. A blank
/// participant never satisfies a group, even when its rules skip blanks.
pub(crate) async fn check_participant<E>(
    eval: &mut E,
    field: &str,
    rules: &RuleList,
) -> ValidatorResult<(bool, Option<String>)>
where
    E: FieldEvaluator + ?Sized,
{
    eval.reset_field(field);
    let values = eval.values(field);
    let verdict = eval
        .evaluate(field, &values, rules, RunMode::ShortCircuit)
        .await?;
    Ok((verdict.passed && eval.is_filled(field), verdict.message))
}

/// Owner-level message of a failed group: the owner's override for the
/// group, else the last staged participant message, else the default.
pub(crate) fn aggregate_message(
    messages: MessageResolver<'_>,
    owner: &str,
    rule: &str,
    last_staged: Option<&str>,
) -> String {
    messages
        .custom()
        .message(owner, rule)
        .or(last_staged)
        .map_or_else(|| messages.catalog_or_fallback(rule), str::to_owned)
}

/// Last message in a staging map.
pub(crate) fn last_staged(staged: &IndexMap<String, String>) -> Option<&str> {
    staged.last().map(|(_, message)| message.as_str())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Owns everything a [`Pass`] borrows, over plain JSON data.

    use regex::Regex;
    use serde_json::{Map, Value};

    use crate::config::ValidatorConfig;
    use crate::engine::Pass;
    use crate::foundation::{DateCache, NoLookup};
    use crate::messages::{CustomMessages, MessageResolver};
    use crate::registry::{RuleList, RuleRegistry};

    pub struct Fixture {
        registry: RuleRegistry,
        config: ValidatorConfig,
        special: Regex,
        custom: CustomMessages,
        data: Map<String, Value>,
        dates: DateCache,
    }

    impl Fixture {
        pub fn new(data: Value) -> Self {
            let Value::Object(data) = data else {
                panic!("fixture data must be an object");
            };
            let config = ValidatorConfig::default();
            Self {
                registry: RuleRegistry::with_builtins(),
                special: Regex::new(&config.special_chars).unwrap(),
                config,
                custom: CustomMessages::new(),
                data,
                dates: DateCache::default(),
            }
        }

        pub fn with_messages(mut self, messages: Value) -> Self {
            self.custom = CustomMessages::from_value(messages);
            self
        }

        pub fn compile(&self, rules: Value) -> RuleList {
            self.registry.compile(&rules).unwrap()
        }

        pub fn pass(&mut self) -> Pass<'_> {
            Pass::new(
                &self.config,
                &self.special,
                MessageResolver::new(
                    self.registry.catalog(),
                    &self.custom,
                    &self.config.fallback_message,
                ),
                &self.data,
                &NoLookup,
                &mut self.dates,
            )
        }
    }
}
