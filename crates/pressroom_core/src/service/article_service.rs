//! Article use-case service: paginated reads and article creation.
//!
//! # Responsibility
//! - Normalize page requests (size clamp, filter trimming, cursor decode).
//! - Compose count + windowed fetch into an [`ArticleConnection`].
//! - Validate and forward article creation to the store.
//!
//! # Invariants
//! - A malformed cursor fails the request before the store is touched.
//! - Pages are ordered `created_at DESC, id DESC` and hold at most the
//!   applied page size.
//! - `total_count` comes from a separate, window-free count. Count and fetch
//!   are not wrapped in a transaction, so concurrent writes can make them
//!   disagree.
//! - `has_previous_page` is `true` exactly when a cursor was supplied.

use crate::model::article::{Article, ArticleInput, ArticleValidationError};
use crate::pagination::cursor::{decode_cursor, CursorError};
use crate::pagination::page::ArticleConnection;
use crate::repo::article_repo::{ArticleFilter, ArticleStore, CursorBound, RepoError};
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Page size used when the request does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound for requested page sizes; larger requests are capped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Error for paginated article reads.
#[derive(Debug)]
pub enum ArticleQueryError {
    /// `after` could not be decoded.
    InvalidCursor(CursorError),
    /// Count or fetch failed in the store.
    Store(RepoError),
}

impl ArticleQueryError {
    /// Returns whether the store was unreachable rather than failing a query.
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_unavailable(),
            Self::InvalidCursor(_) => false,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidCursor(_) => "invalid_cursor",
            Self::Store(err) if err.is_unavailable() => "store_unavailable",
            Self::Store(_) => "store_query_failed",
        }
    }
}

impl Display for ArticleQueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCursor(err) => write!(f, "invalid cursor: {err}"),
            Self::Store(err) => write!(f, "failed to query articles: {err}"),
        }
    }
}

impl Error for ArticleQueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCursor(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<CursorError> for ArticleQueryError {
    fn from(value: CursorError) -> Self {
        Self::InvalidCursor(value)
    }
}

impl From<RepoError> for ArticleQueryError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Error for article creation.
#[derive(Debug)]
pub enum ArticleWriteError {
    Validation(ArticleValidationError),
    Store(RepoError),
}

impl Display for ArticleWriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Store(err) => write!(f, "failed to create article: {err}"),
        }
    }
}

impl Error for ArticleWriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ArticleValidationError> for ArticleWriteError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ArticleWriteError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Filter and pagination parameters for one page read.
///
/// Every field is optional; blank strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticlesPageRequest {
    /// Requested page size. Defaults to 10, clamped to `1..=100`.
    pub first: Option<u32>,
    /// Cursor of the last item already seen.
    pub after: Option<String>,
    /// Word-based full-text query over title or body.
    pub query: Option<String>,
    /// Case-insensitive author name substring.
    pub author: Option<String>,
}

/// Clamps a requested page size to the supported range.
pub fn normalize_page_size(first: Option<u32>) -> u32 {
    first.map_or(DEFAULT_PAGE_SIZE, |value| value.clamp(1, MAX_PAGE_SIZE))
}

/// Paginated query engine and write entry point over an injected store.
pub struct ArticleService<S: ArticleStore> {
    store: S,
}

impl<S: ArticleStore> ArticleService<S> {
    /// Creates a service over the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns one page of articles matching the request filters.
    ///
    /// # Errors
    /// - [`ArticleQueryError::InvalidCursor`] when `after` does not decode.
    /// - [`ArticleQueryError::Store`] when either store round-trip fails.
    pub fn get_articles_page(
        &self,
        request: &ArticlesPageRequest,
    ) -> Result<ArticleConnection, ArticleQueryError> {
        let started_at = Instant::now();
        let result = self.load_page(request);

        match &result {
            Ok(connection) => info!(
                "event=articles_page module=service status=ok limit={} has_cursor={} has_query={} has_author={} returned={} total={} duration_ms={}",
                normalize_page_size(request.first),
                connection.page_info.has_previous_page,
                is_set(request.query.as_deref()),
                is_set(request.author.as_deref()),
                connection.edges.len(),
                connection.total_count,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=articles_page module=service status=error error_code={} duration_ms={} error={}",
                err.code(),
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }

    /// Validates `input` and persists it, creating the author on first use.
    ///
    /// # Errors
    /// - [`ArticleWriteError::Validation`] for a blank title, body or author.
    /// - [`ArticleWriteError::Store`] when the insert transaction fails.
    pub fn create_article(&self, input: &ArticleInput) -> Result<Article, ArticleWriteError> {
        let article = input.validate()?;
        let created = self.store.insert_article(&article)?;
        info!(
            "event=article_create module=service status=ok article_id={} author_id={}",
            created.id, created.author_id
        );
        Ok(created)
    }

    fn load_page(
        &self,
        request: &ArticlesPageRequest,
    ) -> Result<ArticleConnection, ArticleQueryError> {
        let page_size = normalize_page_size(request.first);
        let after = match request.after.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {
                let (id, created_at) = decode_cursor(token)?;
                Some(CursorBound { id, created_at })
            }
            _ => None,
        };
        let filter = ArticleFilter::new(request.query.as_deref(), request.author.as_deref());

        let total_count = self.store.count_articles(&filter)?;
        let mut articles = self.store.query_articles(&filter, page_size + 1, after)?;

        let has_next_page = articles.len() > page_size as usize;
        articles.truncate(page_size as usize);

        Ok(ArticleConnection::from_page(
            articles,
            has_next_page,
            after.is_some(),
            total_count,
        ))
    }
}

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}
