//! Author and article records.
//!
//! # Invariants
//! - `Article::created_at` is epoch seconds assigned by the store at insert.
//! - `ArticleInput::validate` is enforced on the write path only; persisted
//!   rows are read back as-is.
//! - Serialized records use the client shape: string ids and an RFC 3339
//!   `createdAt`.

use serde::{Deserialize, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Store-assigned author identity.
pub type AuthorId = i64;

/// Store-assigned article identity, increasing with insertion order.
pub type ArticleId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    #[serde(serialize_with = "serialize_id")]
    pub id: AuthorId,
    pub name: String,
}

/// Article joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(serialize_with = "serialize_id")]
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing)]
    pub author_id: AuthorId,
    pub author: Author,
    /// Unix epoch seconds.
    #[serde(serialize_with = "serialize_created_at")]
    pub created_at: i64,
}

impl Article {
    /// Formats `created_at` as RFC 3339 (UTC).
    ///
    /// Returns `None` when the stored timestamp is outside the representable
    /// calendar range.
    pub fn created_at_rfc3339(&self) -> Option<String> {
        format_rfc3339(self.created_at)
    }
}

fn format_rfc3339(epoch_seconds: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(epoch_seconds)
        .ok()
        .and_then(|at| at.format(&Rfc3339).ok())
}

fn serialize_id<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

// Out-of-range timestamps fall back to the raw epoch seconds.
fn serialize_created_at<S: Serializer>(
    created_at: &i64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match format_rfc3339(*created_at) {
        Some(formatted) => serializer.serialize_str(&formatted),
        None => serializer.collect_str(created_at),
    }
}

/// Create-article request as received from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub title: String,
    pub body: String,
    pub author_name: String,
}

impl ArticleInput {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            author_name: author_name.into(),
        }
    }

    /// Validates and trims the input into a write-ready record.
    ///
    /// # Errors
    /// - Returns the first blank field, checked in title, body, author order.
    pub fn validate(&self) -> Result<NewArticle, ArticleValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        let body = self.body.trim();
        if body.is_empty() {
            return Err(ArticleValidationError::EmptyBody);
        }
        let author_name = self.author_name.trim();
        if author_name.is_empty() {
            return Err(ArticleValidationError::EmptyAuthorName);
        }

        Ok(NewArticle {
            title: title.to_string(),
            body: body.to_string(),
            author_name: author_name.to_string(),
        })
    }
}

/// Validated article ready for insertion. Only built by [`ArticleInput::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    title: String,
    body: String,
    author_name: String,
}

impl NewArticle {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleValidationError {
    EmptyTitle,
    EmptyBody,
    EmptyAuthorName,
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::EmptyBody => write!(f, "body cannot be empty"),
            Self::EmptyAuthorName => write!(f, "author name cannot be empty"),
        }
    }
}

impl Error for ArticleValidationError {}
