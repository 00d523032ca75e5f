//! Generic CRUD persistence core for document-oriented REST resources.
//! Validation, timestamping, storage and change notification live here;
//! transport adapters sit on top of `CrudService`.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod registry;
pub mod repo;
pub mod service;
pub mod validation;

pub use clock::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::author::Author;
pub use model::book::Book;
pub use model::document::{Document, DocumentId, DocumentMeta, DEFAULT_DOCUMENT_TYPE};
pub use notify::{
    ListenerError, NotifyError, PersistenceEvent, PersistenceListener, PersistenceListenerManager,
};
pub use registry::{ApplicationRegistry, RegistryError};
pub use repo::{
    DocumentRepository, InMemoryDocumentRepository, RepoError, RepoResult,
    SqliteDocumentRepository,
};
pub use service::{CrudError, CrudResult, CrudService, DocumentCrudService};
pub use validation::{
    validate_save, RuleGroup, RuleSet, SaveKind, ValidationError, Validator, Violation,
};

/// Minimal health-check API for embedding binaries.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
