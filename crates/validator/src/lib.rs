//! # formvalidator
//!
//! Declarative form input validation: a rule grammar, a library of atomic
//! rules, conditional groups across fields and debounced live checks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use formvalidator::prelude::*;
//! use serde_json::json;
//!
//! let validator = Arc::new(Validator::new(ValidatorConfig::default())?);
//! let rules = json!({
//!     "name": "required|min:3",
//!     "contact": {"any_of": {"email": "required|email", "phone": "required|numb"}},
//! });
//! let data = json!({"name": "Al", "phone": "0123"});
//! let context = validator
//!     .verify_data(&rules, data.as_object().cloned().unwrap_or_default(), CustomMessages::new())
//!     .await?;
//! assert_eq!(context.error("name"), Some("The field should contain a minimum of 3 characters."));
//! ```
//!
//! ## Layers
//!
//! - [`grammar`]: parses `"required|min:3"`, lists and rule objects
//! - [`validators`]: the built-in atomic rules
//! - [`registry`]: name to rule lookup and compilation of rule sets
//! - [`combinators`]: `any_of`, `any_of_rules`, `only_any_of`, `notRule`
//! - [`messages`]: default templates, overrides and substitution
//! - [`engine`]: verification passes, the error map and live checks
//!
//! A field failing its rules is not an error: it shows up in the context's
//! error map. [`ValidatorError`](foundation::ValidatorError) is reserved for
//! broken rule sets and configuration.

mod macros;

pub mod combinators;
pub mod config;
pub mod engine;
pub mod foundation;
pub mod grammar;
pub mod messages;
pub mod prelude;
pub mod registry;
pub mod validators;
