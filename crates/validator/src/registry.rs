//! Rule registry and rule-set compilation.
//!
//! Each [`Validator`](crate::engine::Validator) owns its registry, so rules
//! registered for one form never leak into another. Compilation resolves the
//! grammar, looks every name up and parses arguments up front: a rule set
//! that compiles never fails later on an unknown name or a bad argument.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::foundation::{Rule, ValidatorError, ValidatorResult};
use crate::grammar::{AtomicRule, ExclusiveSpec, RuleArg, resolve_rule};
use crate::messages::MessageCatalog;
use crate::validators::{FnRule, register_builtins};

/// Rule names handled by the conditional engine rather than the registry.
pub const CONDITIONAL_RULES: [&str; 4] = ["any_of", "any_of_rules", "only_any_of", "notRule"];

// ============================================================================
// REGISTRY
// ============================================================================

/// Named atomic rules plus their default messages.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<dyn Rule>>,
    catalog: MessageCatalog,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("RuleRegistry")
            .field("rules", &names)
            .field("messages", &self.catalog.len())
            .finish()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl RuleRegistry {
    /// A registry without rules or messages.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            catalog: MessageCatalog::empty(),
        }
    }

    /// A registry holding the built-in rule library and default messages.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            rules: HashMap::new(),
            catalog: MessageCatalog::default(),
        };
        register_builtins(&mut registry);
        registry
    }

    /// Adds a rule with its default message.
    ///
    /// Fails with [`ValidatorError::DuplicateRule`] when the name is taken by
    /// a rule, a conditional rule or a default message.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        rule: impl Rule + 'static,
        message: impl Into<String>,
    ) -> ValidatorResult<()> {
        let name = name.into();
        self.ensure_free(&name)?;
        debug!(rule = %name, "registering rule");
        self.catalog.insert(name.clone(), message);
        self.rules.insert(name, Arc::new(rule));
        Ok(())
    }

    /// Adds a closure over text input as a rule. The raw argument reaches
    /// the closure as [`RuleArg::Raw`].
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        message: impl Into<String>,
        check: F,
    ) -> ValidatorResult<()>
    where
        F: Fn(&str, &RuleArg) -> bool + Send + Sync + 'static,
    {
        self.register(name, FnRule::new(check), message)
    }

    /// Adds several rules at once. Nothing is added unless every name is
    /// free and distinct.
    pub fn extend<I>(&mut self, rules: I) -> ValidatorResult<()>
    where
        I: IntoIterator<Item = (String, Arc<dyn Rule>, String)>,
    {
        let batch: Vec<_> = rules.into_iter().collect();
        for (index, (name, _, _)) in batch.iter().enumerate() {
            self.ensure_free(name)?;
            if batch[..index].iter().any(|(earlier, _, _)| earlier == name) {
                return Err(ValidatorError::DuplicateRule { name: name.clone() });
            }
        }
        for (name, rule, message) in batch {
            debug!(rule = %name, "registering rule");
            self.catalog.insert(name.clone(), message);
            self.rules.insert(name, rule);
        }
        Ok(())
    }

    pub(crate) fn insert_builtin(&mut self, name: &str, rule: impl Rule + 'static) {
        self.rules.insert(name.to_owned(), Arc::new(rule));
    }

    fn ensure_free(&self, name: &str) -> ValidatorResult<()> {
        if self.rules.contains_key(name)
            || CONDITIONAL_RULES.contains(&name)
            || self.catalog.contains(name)
        {
            return Err(ValidatorError::DuplicateRule {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name) || CONDITIONAL_RULES.contains(&name)
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    // ------------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------------

    /// Compiles one field's rule declaration.
    pub fn compile(&self, spec: &Value) -> ValidatorResult<RuleList> {
        let rules = resolve_rule(spec)?
            .into_iter()
            .map(|atomic| self.compile_atomic(atomic))
            .collect::<ValidatorResult<Vec<_>>>()?;
        Ok(RuleList { rules })
    }

    /// Compiles a `{field: rules}` object, keeping field order.
    pub fn compile_rules(&self, rules: &Value) -> ValidatorResult<IndexMap<String, RuleList>> {
        let Value::Object(fields) = rules else {
            return Err(ValidatorError::malformed(
                "rules must be an object mapping field names to rule declarations",
            ));
        };
        fields
            .iter()
            .map(|(field, spec)| Ok((field.clone(), self.compile(spec)?)))
            .collect()
    }

    fn compile_atomic(&self, atomic: AtomicRule) -> ValidatorResult<CompiledRule> {
        let AtomicRule { name, arg } = atomic;
        match name.as_str() {
            "any_of" => match arg {
                Some(Value::Object(fields)) => Ok(CompiledRule::AnyOf(
                    fields
                        .iter()
                        .map(|(field, spec)| Ok((field.clone(), self.compile(spec)?)))
                        .collect::<ValidatorResult<_>>()?,
                )),
                _ => Err(ValidatorError::invalid_argument(
                    name,
                    "expects an object mapping field names to rules",
                )),
            },
            "any_of_rules" => match arg {
                Some(Value::Array(alternatives)) if !alternatives.is_empty() => Ok(
                    CompiledRule::AnyOfRules(
                        alternatives
                            .iter()
                            .map(|spec| self.compile(spec))
                            .collect::<ValidatorResult<_>>()?,
                    ),
                ),
                _ => Err(ValidatorError::invalid_argument(
                    name,
                    "expects a non-empty array of rule declarations",
                )),
            },
            "only_any_of" => {
                let raw = arg.unwrap_or(Value::Null);
                let spec = ExclusiveSpec::parse(&name, &raw)?;
                Ok(CompiledRule::OnlyAnyOf {
                    fields: spec
                        .fields
                        .iter()
                        .map(|(field, rules)| Ok((field.clone(), self.compile(rules)?)))
                        .collect::<ValidatorResult<_>>()?,
                    make_invalid_empty: spec.make_invalid_empty,
                })
            }
            "notRule" => match arg {
                Some(spec) => Ok(CompiledRule::Not(self.compile(&spec)?)),
                None => Err(ValidatorError::invalid_argument(
                    name,
                    "expects the rules to negate",
                )),
            },
            _ => {
                let rule = self
                    .rules
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| ValidatorError::UnknownRule { name: name.clone() })?;
                let arg = RuleArg::parse(rule.arg_kind(), &name, arg.as_ref())?;
                Ok(CompiledRule::Atomic(AtomicCheck { name, rule, arg }))
            }
        }
    }
}

// ============================================================================
// COMPILED RULES
// ============================================================================

/// A resolved atomic rule with its parsed argument.
#[derive(Clone)]
pub struct AtomicCheck {
    pub name: String,
    pub rule: Arc<dyn Rule>,
    pub arg: RuleArg,
}

impl fmt::Debug for AtomicCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicCheck")
            .field("name", &self.name)
            .field("arg", &self.arg)
            .finish_non_exhaustive()
    }
}

/// One entry of a compiled rule list.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    Atomic(AtomicCheck),
    /// Passes when any listed field passes its own rules.
    AnyOf(IndexMap<String, RuleList>),
    /// Passes when the owner's value passes any alternative.
    AnyOfRules(Vec<RuleList>),
    /// Passes when exactly one listed field passes its own rules.
    OnlyAnyOf {
        fields: IndexMap<String, RuleList>,
        make_invalid_empty: bool,
    },
    /// Passes when the wrapped rules do not all pass.
    Not(RuleList),
}

impl CompiledRule {
    pub fn name(&self) -> &str {
        match self {
            Self::Atomic(check) => &check.name,
            Self::AnyOf(_) => "any_of",
            Self::AnyOfRules(_) => "any_of_rules",
            Self::OnlyAnyOf { .. } => "only_any_of",
            Self::Not(_) => "notRule",
        }
    }
}

/// A field's compiled rules, in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    rules: Vec<CompiledRule>,
}

impl RuleList {
    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }

    pub fn find(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(CompiledRule::name)
    }
}

impl FromIterator<CompiledRule> for RuleList {
    fn from_iter<I: IntoIterator<Item = CompiledRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a CompiledRule;
    type IntoIter = std::slice::Iter<'a, CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
