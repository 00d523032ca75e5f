//! Startup-built lookup from document type to its repository and service.
//!
//! # Responsibility
//! - Map each document type tag to the repository and service handling it.
//! - Let callers discover the service for a document type without global state.
//!
//! # Invariants
//! - Tags are trimmed, non-empty and unique.
//! - The registry is populated once at startup and read-only afterwards.

use crate::model::document::Document;
use crate::repo::DocumentRepository;
use crate::service::CrudService;
use log::info;
use std::any::{type_name, Any, TypeId};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registration/lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidDocumentType(String),
    DuplicateDocumentType(String),
    NotRegistered(String),
    /// The tag is registered for a different Rust type.
    TypeMismatch {
        document_type: String,
        registered: &'static str,
        requested: &'static str,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDocumentType(value) => write!(f, "document type is invalid: `{value}`"),
            Self::DuplicateDocumentType(value) => {
                write!(f, "document type already registered: {value}")
            }
            Self::NotRegistered(value) => write!(f, "document type not registered: {value}"),
            Self::TypeMismatch {
                document_type,
                registered,
                requested,
            } => write!(
                f,
                "document type `{document_type}` is registered for {registered}, not {requested}"
            ),
        }
    }
}

impl Error for RegistryError {}

struct Registration<D: Document> {
    repository: Arc<dyn DocumentRepository<D>>,
    service: Arc<dyn CrudService<D>>,
}

struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    registration: Box<dyn Any + Send + Sync>,
}

/// Document type registry shared by reference with request-time callers.
#[derive(Default)]
pub struct ApplicationRegistry {
    entries: BTreeMap<String, Entry>,
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the repository and service handling `D`.
    pub fn register<D: Document>(
        &mut self,
        repository: Arc<dyn DocumentRepository<D>>,
        service: Arc<dyn CrudService<D>>,
    ) -> Result<(), RegistryError> {
        let document_type = D::DOCUMENT_TYPE.trim();
        if document_type.is_empty() {
            return Err(RegistryError::InvalidDocumentType(
                D::DOCUMENT_TYPE.to_string(),
            ));
        }
        if self.entries.contains_key(document_type) {
            return Err(RegistryError::DuplicateDocumentType(
                document_type.to_string(),
            ));
        }

        self.entries.insert(
            document_type.to_string(),
            Entry {
                type_id: TypeId::of::<D>(),
                type_name: type_name::<D>(),
                registration: Box::new(Registration { repository, service }),
            },
        );
        info!(
            "event=registry_register module=registry status=ok type={} rust_type={}",
            document_type,
            type_name::<D>()
        );
        Ok(())
    }

    /// Returns the tag under which `D` is registered.
    pub fn document_type<D: Document>(&self) -> Result<&'static str, RegistryError> {
        self.registration::<D>().map(|_| D::DOCUMENT_TYPE.trim())
    }

    pub fn crud_repository<D: Document>(
        &self,
    ) -> Result<Arc<dyn DocumentRepository<D>>, RegistryError> {
        self.registration::<D>()
            .map(|registration| Arc::clone(&registration.repository))
    }

    pub fn crud_service<D: Document>(&self) -> Result<Arc<dyn CrudService<D>>, RegistryError> {
        self.registration::<D>()
            .map(|registration| Arc::clone(&registration.service))
    }

    pub fn contains(&self, document_type: &str) -> bool {
        self.entries.contains_key(document_type.trim())
    }

    /// Returns registered tags in sorted order.
    pub fn document_types(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn registration<D: Document>(&self) -> Result<&Registration<D>, RegistryError> {
        let document_type = D::DOCUMENT_TYPE.trim();
        let entry = self
            .entries
            .get(document_type)
            .ok_or_else(|| RegistryError::NotRegistered(document_type.to_string()))?;

        let mismatch = || RegistryError::TypeMismatch {
            document_type: document_type.to_string(),
            registered: entry.type_name,
            requested: type_name::<D>(),
        };
        if entry.type_id != TypeId::of::<D>() {
            return Err(mismatch());
        }
        entry
            .registration
            .downcast_ref::<Registration<D>>()
            .ok_or_else(mismatch)
    }
}
