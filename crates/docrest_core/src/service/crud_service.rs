//! CRUD service contract and its default implementation.

use crate::clock::{SystemTimeProvider, TimeProvider};
use crate::model::document::{Document, DocumentId};
use crate::notify::{NotifyError, PersistenceListenerManager};
use crate::repo::{DocumentRepository, RepoError};
use crate::validation::{save_violations, SaveKind, ValidationError, Validator, Violation};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type CrudResult<T> = Result<T, CrudError>;

/// Failure of one CRUD service call.
#[derive(Debug)]
pub enum CrudError {
    /// The document broke one or more rules; nothing was persisted.
    Validation(ValidationError),
    /// A required parameter was empty.
    InvalidArgument(&'static str),
    /// The repository failed; propagated unchanged.
    Repository(RepoError),
    /// The write committed but at least one listener failed.
    ///
    /// `id` is the id of the saved or deleted document, so callers can still
    /// reach a document whose id was assigned by this create.
    Listener { id: DocumentId, error: NotifyError },
}

impl Display for CrudError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Repository(err) => write!(f, "{err}"),
            Self::Listener { id, error } => write!(f, "document `{id}` committed but {error}"),
        }
    }
}

impl Error for CrudError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidArgument(_) => None,
            Self::Repository(err) => Some(err),
            Self::Listener { error, .. } => Some(error),
        }
    }
}

impl From<ValidationError> for CrudError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CrudError {
    fn from(value: RepoError) -> Self {
        Self::Repository(value)
    }
}

/// Typed CRUD API exposed to outer layers.
///
/// Batch calls apply the single-document call in input order and stop at the
/// first failure. Earlier elements stay persisted and notified.
///
/// A listener failure does not undo the write: the call returns
/// `CrudError::Listener` carrying the committed document's id.
pub trait CrudService<D: Document>: Send + Sync {
    fn create(&self, document: D) -> CrudResult<D>;

    fn create_all(&self, documents: Vec<D>) -> CrudResult<Vec<D>>;

    fn update(&self, document: D) -> CrudResult<D>;

    fn update_all(&self, documents: Vec<D>) -> CrudResult<Vec<D>>;

    /// Returns `Ok(None)` when no document has this id.
    fn find_one(&self, id: &str) -> CrudResult<Option<D>>;

    /// Fresh read of every document; ordering is repository-defined.
    fn find_all(&self) -> CrudResult<Vec<D>>;

    fn delete(&self, id: &str) -> CrudResult<()>;

    /// Bulk delete; fires no per-document events.
    fn delete_all(&self) -> CrudResult<()>;

    fn persistence_listener_manager(&self) -> &PersistenceListenerManager<D>;

    fn time_provider(&self) -> &dyn TimeProvider;
}

/// Default CRUD service over an injected repository, validator and clock.
pub struct DocumentCrudService<D, R> {
    repository: R,
    validator: Arc<dyn Validator<D>>,
    time_provider: Arc<dyn TimeProvider>,
    listeners: PersistenceListenerManager<D>,
}

impl<D, R> DocumentCrudService<D, R>
where
    D: Document,
    R: DocumentRepository<D>,
{
    /// Creates a service stamping documents with the system clock.
    pub fn new(repository: R, validator: impl Validator<D> + 'static) -> Self {
        Self {
            repository,
            validator: Arc::new(validator),
            time_provider: Arc::new(SystemTimeProvider),
            listeners: PersistenceListenerManager::new(),
        }
    }

    /// Replaces the clock used for `created_millis`/`last_updated_millis`.
    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn save(&self, mut document: D, kind: SaveKind) -> CrudResult<D> {
        let timestamp = self.time_provider.system_time_millis();
        let mut violations = save_violations(self.validator.as_ref(), &document, kind);
        if kind == SaveKind::Update && document.created_millis() > timestamp {
            violations.insert(Violation::new("created_millis", "may not be after last update"));
        }
        if let Err(err) = ValidationError::check(violations) {
            warn!(
                "event=doc_save module=service status=rejected op={} type={} violations={}",
                kind.as_str(),
                D::DOCUMENT_TYPE,
                err.len()
            );
            return Err(err.into());
        }

        if kind == SaveKind::Create {
            document.set_created_millis(timestamp);
        }
        document.set_last_updated_millis(timestamp);

        let saved = self.repository.save(document).map_err(|err| {
            error!(
                "event=doc_save module=service status=error op={} type={} error={}",
                kind.as_str(),
                D::DOCUMENT_TYPE,
                err
            );
            CrudError::from(err)
        })?;
        info!(
            "event=doc_save module=service status=ok op={} type={} id={}",
            kind.as_str(),
            D::DOCUMENT_TYPE,
            saved.id().unwrap_or_default()
        );

        let notified = match kind {
            SaveKind::Create => self.listeners.notify_document_added(&saved),
            SaveKind::Update => self.listeners.notify_document_updated(&saved),
        };
        notified.map_err(|error| listener_failure(saved.id().unwrap_or_default(), error))?;
        Ok(saved)
    }

    fn save_all(&self, documents: Vec<D>, kind: SaveKind) -> CrudResult<Vec<D>> {
        documents
            .into_iter()
            .map(|document| self.save(document, kind))
            .collect()
    }
}

impl<D, R> CrudService<D> for DocumentCrudService<D, R>
where
    D: Document,
    R: DocumentRepository<D>,
{
    fn create(&self, document: D) -> CrudResult<D> {
        self.save(document, SaveKind::Create)
    }

    fn create_all(&self, documents: Vec<D>) -> CrudResult<Vec<D>> {
        self.save_all(documents, SaveKind::Create)
    }

    fn update(&self, document: D) -> CrudResult<D> {
        self.save(document, SaveKind::Update)
    }

    fn update_all(&self, documents: Vec<D>) -> CrudResult<Vec<D>> {
        self.save_all(documents, SaveKind::Update)
    }

    fn find_one(&self, id: &str) -> CrudResult<Option<D>> {
        let id = require_id(id)?;
        Ok(self.repository.find_one(id)?)
    }

    fn find_all(&self) -> CrudResult<Vec<D>> {
        Ok(self.repository.find_all()?)
    }

    fn delete(&self, id: &str) -> CrudResult<()> {
        let id = require_id(id)?;
        self.repository.delete(id).map_err(|err| {
            error!(
                "event=doc_delete module=service status=error type={} error={}",
                D::DOCUMENT_TYPE,
                err
            );
            CrudError::from(err)
        })?;
        info!(
            "event=doc_delete module=service status=ok type={} id={}",
            D::DOCUMENT_TYPE,
            id
        );

        self.listeners
            .notify_document_deleted(id)
            .map_err(|error| listener_failure(id, error))
    }

    fn delete_all(&self) -> CrudResult<()> {
        self.repository.delete_all()?;
        info!(
            "event=doc_delete_all module=service status=ok type={}",
            D::DOCUMENT_TYPE
        );
        Ok(())
    }

    fn persistence_listener_manager(&self) -> &PersistenceListenerManager<D> {
        &self.listeners
    }

    fn time_provider(&self) -> &dyn TimeProvider {
        self.time_provider.as_ref()
    }
}

fn require_id(id: &str) -> CrudResult<&str> {
    if id.trim().is_empty() {
        return Err(CrudError::InvalidArgument("parameter id cannot be empty"));
    }
    Ok(id)
}

fn listener_failure(id: &str, error: NotifyError) -> CrudError {
    CrudError::Listener {
        id: id.to_string(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::{require_id, CrudError};

    #[test]
    fn require_id_rejects_blank_values() {
        assert!(matches!(require_id(""), Err(CrudError::InvalidArgument(_))));
        assert!(matches!(require_id("  \t"), Err(CrudError::InvalidArgument(_))));
        assert_eq!(require_id("abc").unwrap(), "abc");
    }
}
