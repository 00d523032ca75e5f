//! Closure-based rule sets.

use super::{RuleGroup, Validator, Violation};
use crate::model::document::Document;
use std::collections::BTreeSet;

type Check<D> = Box<dyn Fn(&D) -> bool + Send + Sync>;

struct Rule<D> {
    group: RuleGroup,
    path: String,
    message: String,
    check: Check<D>,
}

/// Ordered list of `(group, path, message, check)` rules.
///
/// A rule reports its violation when `check` returns `false`.
pub struct RuleSet<D> {
    rules: Vec<Rule<D>>,
}

impl<D> Default for RuleSet<D> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<D> RuleSet<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one rule.
    pub fn rule(
        mut self,
        group: RuleGroup,
        path: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&D) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            group,
            path: path.into(),
            message: message.into(),
            check: Box::new(check),
        });
        self
    }

    /// Requires the string returned by `field` to contain non-whitespace.
    pub fn not_blank(
        self,
        group: RuleGroup,
        path: impl Into<String>,
        field: impl Fn(&D) -> &str + Send + Sync + 'static,
    ) -> Self {
        self.rule(group, path, "may not be empty", move |doc| {
            !field(doc).trim().is_empty()
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<D: Document> RuleSet<D> {
    /// Rules every document carries: no id on create, an id on update.
    ///
    /// A blank id counts as absent in both groups.
    pub fn for_documents() -> Self {
        Self::new()
            .rule(RuleGroup::CreateChecks, "id", "must be null", |doc: &D| {
                !doc.has_id()
            })
            .rule(RuleGroup::UpdateChecks, "id", "may not be null", |doc: &D| {
                doc.has_id()
            })
    }
}

impl<D> Validator<D> for RuleSet<D> {
    fn validate(&self, document: &D, group: RuleGroup) -> BTreeSet<Violation> {
        self.rules
            .iter()
            .filter(|rule| rule.group == group && !(rule.check)(document))
            .map(|rule| Violation::new(rule.path.as_str(), rule.message.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::RuleSet;
    use crate::model::document::{Document, DocumentMeta};
    use crate::validation::{RuleGroup, Validator, Violation};

    #[derive(Debug, Clone, Default)]
    struct Note {
        meta: DocumentMeta,
        body: String,
    }

    impl Document for Note {
        fn meta(&self) -> &DocumentMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut DocumentMeta {
            &mut self.meta
        }
    }

    fn rules() -> RuleSet<Note> {
        RuleSet::for_documents().not_blank(RuleGroup::Default, "body", |n: &Note| n.body.as_str())
    }

    #[test]
    fn only_rules_of_requested_group_run() {
        let note = Note {
            meta: DocumentMeta::with_id("n1"),
            body: String::new(),
        };

        let default = rules().validate(&note, RuleGroup::Default);
        assert_eq!(
            default.into_iter().collect::<Vec<_>>(),
            vec![Violation::new("body", "may not be empty")]
        );

        let create = rules().validate(&note, RuleGroup::CreateChecks);
        assert_eq!(
            create.into_iter().collect::<Vec<_>>(),
            vec![Violation::new("id", "must be null")]
        );

        assert!(rules().validate(&note, RuleGroup::UpdateChecks).is_empty());
    }

    #[test]
    fn update_checks_reject_missing_or_blank_id() {
        let mut note = Note {
            body: "x".to_string(),
            ..Note::default()
        };
        assert_eq!(rules().validate(&note, RuleGroup::UpdateChecks).len(), 1);

        note.set_id(" ");
        assert_eq!(rules().validate(&note, RuleGroup::UpdateChecks).len(), 1);
    }

    #[test]
    fn create_checks_accept_blank_id() {
        let mut note = Note {
            body: "x".to_string(),
            ..Note::default()
        };
        for blank in ["", "  "] {
            note.set_id(blank);
            assert!(rules().validate(&note, RuleGroup::CreateChecks).is_empty());
        }
    }

    #[test]
    fn validation_is_repeatable_for_same_input() {
        let note = Note::default();
        let set = rules();
        assert_eq!(
            set.validate(&note, RuleGroup::Default),
            set.validate(&note, RuleGroup::Default)
        );
        assert_eq!(set.len(), 3);
    }
}
