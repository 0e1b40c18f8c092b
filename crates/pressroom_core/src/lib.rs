//! Core of the pressroom article service.
//!
//! Holds the paginated, filterable article query engine, the opaque cursor
//! codec it pages with, and the SQLite store it reads from.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{load_config, ConfigError, PressroomConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{
    Article, ArticleId, ArticleInput, ArticleValidationError, Author, AuthorId, NewArticle,
};
pub use pagination::cursor::{decode_cursor, encode_cursor, CursorError};
pub use pagination::page::{ArticleConnection, ArticleEdge, PageInfo};
pub use repo::article_repo::{
    ArticleFilter, ArticleStore, CursorBound, RepoError, RepoResult, SqliteArticleRepository,
};
pub use service::article_service::{
    normalize_page_size, ArticleQueryError, ArticleService, ArticleWriteError,
    ArticlesPageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
