//! Document identity and audit metadata.
//!
//! # Responsibility
//! - Define the capability every persisted resource exposes to the CRUD core.
//! - Carry the document-type tag used for registry lookup.
//!
//! # Invariants
//! - `id` is absent until the repository assigns one on first save.
//! - `created_millis` is written once, on the first successful create.
//! - `created_millis <= last_updated_millis` for every document persisted
//!   through the service layer.

use serde::{Deserialize, Serialize};

/// Opaque document identifier assigned by the repository.
pub type DocumentId = String;

/// Tag used by documents that do not declare their own type.
pub const DEFAULT_DOCUMENT_TYPE: &str = "DEFAULT-DOCUMENT-TYPE";

/// Identity and timestamps shared by all documents.
///
/// Embed it with `#[serde(flatten)]` so the fields serialize next to the
/// document's own fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// `None` before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Unix epoch milliseconds of the first successful create.
    #[serde(default)]
    pub created_millis: i64,
    /// Unix epoch milliseconds of the latest successful save.
    #[serde(default)]
    pub last_updated_millis: i64,
}

impl DocumentMeta {
    /// Metadata for a document that already carries an identifier.
    pub fn with_id(id: impl Into<DocumentId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// Capability required from every document handled by the CRUD core.
pub trait Document: Clone + Send + Sync + 'static {
    /// Registry tag for this document type.
    const DOCUMENT_TYPE: &'static str = DEFAULT_DOCUMENT_TYPE;

    fn meta(&self) -> &DocumentMeta;

    fn meta_mut(&mut self) -> &mut DocumentMeta;

    fn id(&self) -> Option<&str> {
        self.meta().id.as_deref()
    }

    /// Returns whether the document carries a non-blank identifier.
    fn has_id(&self) -> bool {
        self.id().is_some_and(|id| !id.trim().is_empty())
    }

    fn set_id(&mut self, id: impl Into<DocumentId>) {
        self.meta_mut().id = Some(id.into());
    }

    fn created_millis(&self) -> i64 {
        self.meta().created_millis
    }

    fn set_created_millis(&mut self, millis: i64) {
        self.meta_mut().created_millis = millis;
    }

    fn last_updated_millis(&self) -> i64 {
        self.meta().last_updated_millis
    }

    fn set_last_updated_millis(&mut self, millis: i64) {
        self.meta_mut().last_updated_millis = millis;
    }
}
