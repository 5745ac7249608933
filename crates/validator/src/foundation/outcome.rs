//! Results of running rules.

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Result of one atomic rule on one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// The caller records the rule's templated message.
    Failed,
    /// The rule produced its own message.
    Reported(String),
}

impl Outcome {
    pub fn from_bool(passed: bool) -> Self {
        if passed { Self::Passed } else { Self::Failed }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        Self::from_bool(passed)
    }
}

/// How a field's rule list is walked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Stop at the first failing rule.
    #[default]
    ShortCircuit,
    /// Run every rule; the field passes only if all of them pass.
    ToCompletion,
}

/// Verdict for one field's rule list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldVerdict {
    pub passed: bool,
    /// Message to show on the field, when the failure produced one.
    pub message: Option<String>,
    /// Name of the first rule that failed.
    pub failed_rule: Option<String>,
    /// Conditional groups resolved while walking the list, by rule name.
    pub groups: Vec<(String, ConditionalGroupResult)>,
}

impl FieldVerdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            ..Self::default()
        }
    }

    pub fn fail(rule: impl Into<String>, message: Option<String>) -> Self {
        Self {
            passed: false,
            message,
            failed_rule: Some(rule.into()),
            groups: Vec::new(),
        }
    }

    /// Sub-fields a resolved group wants emptied, mapped to their message.
    pub fn must_be_empty(&self) -> impl Iterator<Item = (&str, &str)> {
        self.groups.iter().flat_map(|(_, group)| {
            group
                .must_be_empty
                .iter()
                .map(|(field, message)| (field.as_str(), message.as_str()))
        })
    }
}

/// Why a conditional group failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFailure {
    /// No alternative of `any_of` / `any_of_rules` passed.
    NoneMatched,
    /// No field of `only_any_of` passed.
    MatchNone,
    /// More than one field of `only_any_of` passed.
    MatchMultiple,
    /// One field passed but others are filled in.
    MustBeEmpty,
    /// The rules wrapped by `notRule` all passed.
    Negated,
}

/// Resolved verdict of one conditional group.
///
/// Sub-field messages stay here until the orchestrator decides what to
/// show; nothing is written to the visible error map while the group runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionalGroupResult {
    pub passed: bool,
    /// Message for the owning field.
    pub aggregate_message: Option<String>,
    /// Staged message of every failing participant.
    pub per_subfield: IndexMap<String, String>,
    /// Participants that passed their own rules.
    pub passing: SmallVec<[String; 2]>,
    /// Filled participants that must be emptied, with their message.
    pub must_be_empty: IndexMap<String, String>,
    pub failure: Option<GroupFailure>,
}

impl ConditionalGroupResult {
    pub fn passed(passing: SmallVec<[String; 2]>) -> Self {
        Self {
            passed: true,
            passing,
            ..Self::default()
        }
    }

    pub fn failed(failure: GroupFailure, aggregate_message: Option<String>) -> Self {
        Self {
            passed: false,
            aggregate_message,
            failure: Some(failure),
            ..Self::default()
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_staged(mut self, per_subfield: IndexMap<String, String>) -> Self {
        self.per_subfield = per_subfield;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_outcome_from_bool() {
        assert_eq!(Outcome::from(true), Outcome::Passed);
        assert_eq!(Outcome::from_bool(false), Outcome::Failed);
        assert!(!Outcome::Reported("x".into()).is_passed());
    }

    #[test]
    fn test_must_be_empty_flattens_groups() {
        let mut group = ConditionalGroupResult::failed(GroupFailure::MustBeEmpty, None);
        group.must_be_empty.insert("fax".into(), "Please make this field empty.".into());
        let verdict = FieldVerdict {
            groups: vec![("only_any_of".into(), group)],
            ..FieldVerdict::fail("only_any_of", None)
        };
        assert_eq!(
            verdict.must_be_empty().collect::<Vec<_>>(),
            vec![("fax", "Please make this field empty.")]
        );

        let passed = ConditionalGroupResult::passed(smallvec!["phone".to_owned()]);
        assert!(passed.passed);
        assert!(passed.failure.is_none());
    }
}
