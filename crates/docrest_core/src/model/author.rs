//! Author resource.

use crate::model::document::{Document, DocumentMeta};
use crate::validation::{RuleGroup, RuleSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// A person credited on one or more books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            meta: DocumentMeta::default(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
        }
    }

    /// Base document rules plus non-blank names and a well-formed email.
    pub fn validator() -> RuleSet<Self> {
        RuleSet::for_documents()
            .not_blank(RuleGroup::Default, "first_name", |a: &Self| {
                a.first_name.as_str()
            })
            .not_blank(RuleGroup::Default, "last_name", |a: &Self| {
                a.last_name.as_str()
            })
            .rule(
                RuleGroup::Default,
                "email",
                "not a well-formed email address",
                |a: &Self| a.email.as_deref().map_or(true, |email| EMAIL_RE.is_match(email)),
            )
    }
}

impl Document for Author {
    const DOCUMENT_TYPE: &'static str = "author";

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}
