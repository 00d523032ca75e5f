//! Generic CRUD use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, stamping, persistence and notification.
//! - Keep callers (HTTP adapters, CLI) decoupled from storage details.
//!
//! # Invariants
//! - Validation and stamping happen before persistence; persistence happens
//!   before notification; notification completes before the result returns.
//! - A rejected document never reaches the repository and fires no event.
//! - Errors are never swallowed: each failed call returns exactly one error.

pub mod crud_service;

pub use crud_service::{CrudError, CrudResult, CrudService, DocumentCrudService};
