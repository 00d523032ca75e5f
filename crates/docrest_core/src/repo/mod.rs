//! Repository abstraction and storage adapters.
//!
//! # Responsibility
//! - Define the storage contract consumed by the CRUD service.
//! - Provide in-memory and SQLite-backed document stores.
//!
//! # Invariants
//! - `save` assigns an identifier when the document has none and returns the
//!   stored form.
//! - `find_one` reports a missing document as `Ok(None)`, never as an error.
//! - Deleting an unknown id succeeds.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryDocumentRepository;
pub use sqlite::SqliteDocumentRepository;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage failure reported by a repository.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// A stored row could not be decoded into the document type.
    InvalidData(String),
    /// A lock guarding the store was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// Failure reported by a store outside this crate.
    Backend(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
            Self::LockPoisoned(store) => write!(f, "{store} lock poisoned"),
            Self::Backend(message) => write!(f, "document store failed: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::LockPoisoned(_) | Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Opaque document storage used by the CRUD service.
pub trait DocumentRepository<D>: Send + Sync {
    /// Inserts or replaces `document`, assigning an id when absent.
    fn save(&self, document: D) -> RepoResult<D>;
    fn find_one(&self, id: &str) -> RepoResult<Option<D>>;
    /// Reads every stored document; ordering is adapter-defined.
    fn find_all(&self) -> RepoResult<Vec<D>>;
    fn delete(&self, id: &str) -> RepoResult<()>;
    fn delete_all(&self) -> RepoResult<()>;
}

impl<D, R> DocumentRepository<D> for Arc<R>
where
    R: DocumentRepository<D> + ?Sized,
{
    fn save(&self, document: D) -> RepoResult<D> {
        (**self).save(document)
    }

    fn find_one(&self, id: &str) -> RepoResult<Option<D>> {
        (**self).find_one(id)
    }

    fn find_all(&self) -> RepoResult<Vec<D>> {
        (**self).find_all()
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn delete_all(&self) -> RepoResult<()> {
        (**self).delete_all()
    }
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
