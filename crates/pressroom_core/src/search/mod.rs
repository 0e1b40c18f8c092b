//! Full-text matching over article title and body.
//!
//! # Responsibility
//! - Translate free-text user input into safe FTS5 match expressions.
//!
//! # See also
//! - `db/migrations/0002_article_fts.sql` for the index definition.

pub mod fts;
