//! Persistence event notification.
//!
//! # Responsibility
//! - Define the listener callback contract for add/update/delete events.
//! - Keep an ordered, identity-keyed listener registry per service.
//!
//! # Invariants
//! - Events are dispatched only after the triggering write committed.
//! - Dispatch order equals registration order.
//! - One failing listener never prevents dispatch to the rest; the first
//!   failure is reported once every listener has been attempted.
//! - Registry lock poisoning is recovered: the lock is never held while a
//!   listener runs, so the guarded list cannot be left half-updated.

mod manager;

pub use manager::PersistenceListenerManager;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Persistence event kinds delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceEvent {
    Added,
    Updated,
    Deleted,
}

impl PersistenceEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// Observer of committed document writes.
///
/// Callbacks borrow the document only for the duration of the call. All
/// callbacks default to no-ops so listeners implement only what they need.
pub trait PersistenceListener<D>: Send + Sync {
    fn document_added(&self, _document: &D) -> Result<(), ListenerError> {
        Ok(())
    }

    fn document_updated(&self, _document: &D) -> Result<(), ListenerError> {
        Ok(())
    }

    fn document_deleted(&self, _id: &str) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Failure raised by one listener callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerError {
    pub reason: String,
}

impl ListenerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Display for ListenerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener failed: {}", self.reason)
    }
}

impl Error for ListenerError {}

/// Outcome of a dispatch round in which at least one listener failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    pub event: PersistenceEvent,
    /// First failure in dispatch order.
    pub first: ListenerError,
    pub failed: usize,
    pub attempted: usize,
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} listeners failed on `{}` event; first: {}",
            self.failed,
            self.attempted,
            self.event.as_str(),
            self.first
        )
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.first)
    }
}
