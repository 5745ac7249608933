//! The validation engine: registry, configuration and compiled patterns.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::context::ValidationContext;
use crate::config::ValidatorConfig;
use crate::foundation::{FieldSource, ValidatorError, ValidatorResult};
use crate::messages::CustomMessages;
use crate::registry::RuleRegistry;

/// Owns the rules a form may use and the settings they run with.
///
/// Registration needs `&mut self`; once shared behind an `Arc`, the engine is
/// read-only and hands out [`ValidationContext`]s.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: RuleRegistry,
    config: ValidatorConfig,
    special_chars: Regex,
}

impl Validator {
    /// An engine with the built-in rule library.
    pub fn new(config: ValidatorConfig) -> ValidatorResult<Self> {
        Self::with_registry(config, RuleRegistry::with_builtins())
    }

    /// An engine over a caller-assembled registry.
    pub fn with_registry(config: ValidatorConfig, registry: RuleRegistry) -> ValidatorResult<Self> {
        config.check()?;
        let special_chars =
            Regex::new(&config.special_chars).map_err(|error| ValidatorError::InvalidConfig {
                reason: format!("special_chars: {error}"),
            })?;
        Ok(Self {
            registry,
            config,
            special_chars,
        })
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn special_chars(&self) -> &Regex {
        &self.special_chars
    }

    /// Compiles `rules` (a `{field: spec}` object) into a fresh context.
    pub fn context(self: &Arc<Self>, rules: &Value) -> ValidatorResult<ValidationContext> {
        let compiled = self.registry.compile_rules(rules)?;
        Ok(ValidationContext::new(Arc::clone(self), compiled))
    }

    /// One-shot submit check: compiles, verifies every field and returns the
    /// finished context for reading errors.
    pub async fn verify_data(
        self: &Arc<Self>,
        rules: &Value,
        data: impl FieldSource + 'static,
        messages: CustomMessages,
    ) -> ValidatorResult<ValidationContext> {
        let mut context = self
            .context(rules)?
            .with_data(data)
            .with_messages(messages);
        context.verify_data().await?;
        Ok(context)
    }
}
