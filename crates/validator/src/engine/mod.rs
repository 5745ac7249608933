//!
//! Validation engine
//! Runs compiled rules against form data and maintains the visible error
//! map.
//!
//! - [`Validator`]: registry plus configuration, shared behind an `Arc`
//! - [`ValidationContext`]: one form's rules, data and errors
//! - [`Pass`]: a single evaluation over borrowed state
//! - [`LiveValidator`]: debounced checks while the form is edited

pub mod context;
pub mod live;
pub mod pass;
pub mod validator;

pub use context::{StagedErrors, ValidationContext};
pub use live::{FormState, LiveCallback, LiveReport, LiveTrigger, LiveValidator};
pub use pass::Pass;
pub use validator::Validator;
