//! Book resource.

use crate::model::document::{Document, DocumentId, DocumentMeta};
use crate::validation::{RuleGroup, RuleSet};
use serde::{Deserialize, Serialize};

/// A published title linked to its authors by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub title: String,
    /// ISBN-10 or ISBN-13; hyphens and spaces are ignored.
    pub isbn: String,
    #[serde(default)]
    pub author_ids: Vec<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
}

impl Book {
    pub fn new(title: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            isbn: isbn.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author_id: impl Into<DocumentId>) -> Self {
        self.author_ids.push(author_id.into());
        self
    }

    pub fn validator() -> RuleSet<Self> {
        RuleSet::for_documents()
            .not_blank(RuleGroup::Default, "title", |b: &Self| b.title.as_str())
            .rule(
                RuleGroup::Default,
                "isbn",
                "must contain 10 or 13 digits",
                |b: &Self| is_isbn(&b.isbn),
            )
            .rule(
                RuleGroup::Default,
                "author_ids",
                "must reference at least one author",
                |b: &Self| b.author_ids.iter().any(|id| !id.trim().is_empty()),
            )
            .rule(
                RuleGroup::Default,
                "published_year",
                "may not be negative",
                |b: &Self| b.published_year.map_or(true, |year| year >= 0),
            )
    }
}

impl Document for Book {
    const DOCUMENT_TYPE: &'static str = "book";

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

fn is_isbn(value: &str) -> bool {
    let digits: Vec<char> = value
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    match digits.len() {
        // ISBN-10 allows a trailing `X` check digit.
        10 => {
            digits[..9].iter().all(char::is_ascii_digit)
                && (digits[9].is_ascii_digit() || digits[9] == 'X')
        }
        13 => digits.iter().all(char::is_ascii_digit),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_isbn;

    #[test]
    fn isbn_accepts_both_lengths_and_ignores_hyphens() {
        assert!(is_isbn("978-0-13-468599-1"));
        assert!(is_isbn("0-306-40615-2"));
        assert!(is_isbn("080442957X"));
        assert!(!is_isbn("12345"));
        assert!(!is_isbn("97801346859ab"));
    }
}
