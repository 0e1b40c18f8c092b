//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store capability the query engine is constructed with.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Read paths never mutate authors or articles.
//! - Read paths run without explicit transactions.

pub mod article_repo;
