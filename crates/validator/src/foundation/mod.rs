//! Building blocks shared by every layer.
//!
//! - **Values**: [`FieldValue`], [`FileValue`], [`Input`] and the
//!   [`FieldSource`] / [`FieldLookup`] traits the engine reads them through
//! - **Results**: [`Outcome`] for one rule, [`FieldVerdict`] for a field,
//!   [`ConditionalGroupResult`] for a conditional group
//! - **Traits**: [`Rule`] and [`FieldEvaluator`]
//! - **Errors**: [`ValidatorError`], raised for broken rule sets only
//!
//! A field that fails its rules is not an error. It produces a failing
//! verdict and, in the engine, an entry in the error map.

pub mod context;
pub mod error;
pub mod outcome;
pub mod traits;
pub mod value;

pub use context::{CachedDate, DateCache, RuleContext};
pub use error::{ValidatorError, ValidatorResult};
pub use outcome::{ConditionalGroupResult, FieldVerdict, GroupFailure, Outcome, RunMode};
pub use traits::{FieldEvaluator, Rule};
pub use value::{
    EmptySource, FieldLookup, FieldSource, FieldValue, FileValue, FormData, Input, NoLookup,
    OCTET_STREAM, is_blank,
};
