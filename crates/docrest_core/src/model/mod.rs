//! Document model.
//!
//! # Responsibility
//! - Define the identity/timestamp capability shared by persisted documents.
//! - Provide the sample `author` and `book` resources.
//!
//! # Invariants
//! - Every document type declares one registry tag.
//! - Timestamps are Unix epoch milliseconds.

pub mod author;
pub mod book;
pub mod document;
