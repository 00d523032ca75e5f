//! Document validation contracts.
//!
//! # Responsibility
//! - Describe rule violations as `(path, message)` pairs.
//! - Select the rule groups that apply to create and update saves.
//!
//! # Invariants
//! - Validators are pure: no side effects on the document or elsewhere.
//! - Violation sets iterate in a deterministic `(path, message)` order.
//! - Every save runs the default group plus exactly one of
//!   `CreateChecks`/`UpdateChecks`.

mod rule_set;

pub use rule_set::RuleSet;

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Violation {
    /// Attribute path of the offending field, e.g. `first_name`.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.path, self.message)
    }
}

/// Named subset of rules applied conditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleGroup {
    /// Applied on every save.
    Default,
    /// Applied only when creating.
    CreateChecks,
    /// Applied only when updating.
    UpdateChecks,
}

/// Kind of save being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Create,
    Update,
}

impl SaveKind {
    /// Group that runs alongside `RuleGroup::Default` for this save.
    pub fn rule_group(self) -> RuleGroup {
        match self {
            Self::Create => RuleGroup::CreateChecks,
            Self::Update => RuleGroup::UpdateChecks,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// Checks a document against the rules registered for one group.
pub trait Validator<D>: Send + Sync {
    fn validate(&self, document: &D, group: RuleGroup) -> BTreeSet<Violation>;
}

/// Non-empty set of violations that rejected a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: BTreeSet<Violation>,
}

impl ValidationError {
    /// `Ok` for an empty set.
    pub(crate) fn check(violations: BTreeSet<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    pub fn violations(&self) -> &BTreeSet<Violation> {
        &self.violations
    }

    pub fn into_violations(self) -> BTreeSet<Violation> {
        self.violations
    }

    /// Returns whether any violation targets `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .violations
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "validation failed: {rendered}")
    }
}

impl Error for ValidationError {}

/// Runs the default group plus the group selected by `kind`.
///
/// # Errors
/// - Returns `ValidationError` carrying the union of both groups' violations
///   when either group reports anything.
pub fn validate_save<D, V>(
    validator: &V,
    document: &D,
    kind: SaveKind,
) -> Result<(), ValidationError>
where
    V: Validator<D> + ?Sized,
{
    ValidationError::check(save_violations(validator, document, kind))
}

pub(crate) fn save_violations<D, V>(
    validator: &V,
    document: &D,
    kind: SaveKind,
) -> BTreeSet<Violation>
where
    V: Validator<D> + ?Sized,
{
    let mut violations = validator.validate(document, RuleGroup::Default);
    violations.extend(validator.validate(document, kind.rule_group()));
    violations
}

#[cfg(test)]
mod tests {
    use super::{validate_save, RuleGroup, SaveKind, Validator, Violation};
    use std::collections::BTreeSet;

    struct PerGroup;

    impl Validator<()> for PerGroup {
        fn validate(&self, _document: &(), group: RuleGroup) -> BTreeSet<Violation> {
            let path = match group {
                RuleGroup::Default => "default",
                RuleGroup::CreateChecks => "create",
                RuleGroup::UpdateChecks => "update",
            };
            BTreeSet::from([Violation::new(path, "failed")])
        }
    }

    #[test]
    fn create_runs_default_and_create_groups_only() {
        let err = validate_save(&PerGroup, &(), SaveKind::Create).unwrap_err();
        assert!(err.has_path("default"));
        assert!(err.has_path("create"));
        assert!(!err.has_path("update"));
    }

    #[test]
    fn update_runs_default_and_update_groups_only() {
        let err = validate_save(&PerGroup, &(), SaveKind::Update).unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.has_path("update"));
        assert!(!err.has_path("create"));
    }

    #[test]
    fn display_joins_path_and_message_in_order() {
        let err = validate_save(&PerGroup, &(), SaveKind::Create).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: create failed, default failed"
        );
    }
}
