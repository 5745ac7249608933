//! Prelude module for convenient imports.
//!
//! Provides a single `use formvalidator::prelude::*;` import that brings in
//! the engine, values, messages and the extension traits.

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::config::{LiveConfig, ValidatorConfig};
pub use crate::engine::{
    FormState, LiveReport, LiveTrigger, LiveValidator, ValidationContext, Validator,
};

// ============================================================================
// FOUNDATION: values, results, traits, errors
// ============================================================================

pub use crate::foundation::{
    FieldLookup, FieldSource, FieldValue, FieldVerdict, FileValue, FormData, Input, Outcome,
    Rule, RuleContext, RunMode, ValidatorError, ValidatorResult,
};

// ============================================================================
// RULES AND MESSAGES
// ============================================================================

pub use crate::grammar::{ArgKind, RuleArg};
pub use crate::messages::{CustomMessages, MessageCatalog};
pub use crate::registry::{RuleList, RuleRegistry};
