//! Configuration errors.
//!
//! A failing field is never an error: it ends up in the context's error map.
//! [`ValidatorError`] is reserved for mistakes in the rule set itself, such as
//! an unknown rule name or a non-numeric threshold, and is surfaced to the
//! caller of `verify` / `verify_data` instead of being merged with user-facing
//! messages.

/// Error type for rule compilation and evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    /// The rule spec has a shape the grammar does not accept.
    #[error("malformed rule spec: {reason}")]
    MalformedSpec { reason: String },

    /// No rule with this name is registered.
    #[error("there is no rule defined with name `{name}`")]
    UnknownRule { name: String },

    /// A rule or default message with this name already exists.
    #[error("a rule or error message named `{name}` already exists")]
    DuplicateRule { name: String },

    /// The argument does not fit the shape the rule expects.
    #[error("invalid argument for `{rule}`: {reason}")]
    InvalidArgument { rule: String, reason: String },

    /// A numeric argument could not be parsed.
    #[error("`{rule}` expects a number, got `{value}`")]
    NotANumber { rule: String, value: String },

    /// An aspect ratio that is neither a number nor `W:H`.
    #[error("invalid aspect ratio `{value}`: expected a format like 16:9 or 4.8089:1.7823")]
    InvalidAspectRatio { value: String },

    /// A `regex` / `notRegex` pattern failed to compile.
    #[error("invalid pattern for `{rule}`: {message}")]
    InvalidPattern { rule: String, message: String },

    /// Validator configuration could not be loaded.
    #[error("invalid validator configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ValidatorError {
    /// Shorthand for [`ValidatorError::InvalidArgument`].
    pub fn invalid_argument(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ValidatorError::MalformedSpec`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSpec {
            reason: reason.into(),
        }
    }

    /// Broad error category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::MalformedSpec { .. } => "grammar",
            Self::UnknownRule { .. } => "registry",
            Self::DuplicateRule { .. } => "registry",
            Self::InvalidArgument { .. } => "argument",
            Self::NotANumber { .. } => "argument",
            Self::InvalidAspectRatio { .. } => "argument",
            Self::InvalidPattern { .. } => "argument",
            Self::InvalidConfig { .. } => "config",
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::MalformedSpec { .. } => "RULE_MALFORMED_SPEC",
            Self::UnknownRule { .. } => "RULE_UNKNOWN",
            Self::DuplicateRule { .. } => "RULE_DUPLICATE",
            Self::InvalidArgument { .. } => "RULE_INVALID_ARGUMENT",
            Self::NotANumber { .. } => "RULE_NOT_A_NUMBER",
            Self::InvalidAspectRatio { .. } => "RULE_INVALID_ASPECT_RATIO",
            Self::InvalidPattern { .. } => "RULE_INVALID_PATTERN",
            Self::InvalidConfig { .. } => "CONFIG_INVALID",
        }
    }
}

impl From<serde_json::Error> for ValidatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ValidatorError::UnknownRule {
            name: "frobnicate".into(),
        };
        assert_eq!(
            err.to_string(),
            "there is no rule defined with name `frobnicate`"
        );

        let err = ValidatorError::NotANumber {
            rule: "min".into(),
            value: "four".into(),
        };
        assert_eq!(err.to_string(), "`min` expects a number, got `four`");

        let err = ValidatorError::InvalidAspectRatio {
            value: "wide".into(),
        };
        assert!(err.to_string().starts_with("invalid aspect ratio `wide`"));
    }

    #[test]
    fn codes_and_categories() {
        let err = ValidatorError::malformed("nested array");
        assert_eq!(err.code(), "RULE_MALFORMED_SPEC");
        assert_eq!(err.category(), "grammar");

        let err = ValidatorError::DuplicateRule {
            name: "alpha".into(),
        };
        assert_eq!(err.code(), "RULE_DUPLICATE");
        assert_eq!(err.category(), "registry");

        let err = ValidatorError::invalid_argument("dimension", "expected an object");
        assert_eq!(err.category(), "argument");
    }

    #[test]
    fn json_errors_become_config_errors() {
        let err: ValidatorError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "CONFIG_INVALID");
    }
}
