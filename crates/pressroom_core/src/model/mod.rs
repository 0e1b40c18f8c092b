//! Domain model for authors and articles.
//!
//! # Responsibility
//! - Define the records the query engine reads and the write path produces.
//! - Own input validation for article creation.
//!
//! # Invariants
//! - Identities (`AuthorId`, `ArticleId`) are assigned by the store.
//! - Articles are immutable once persisted.

pub mod article;
