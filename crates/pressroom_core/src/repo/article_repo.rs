//! Article store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the filtered count and keyset-windowed fetch used by paging.
//! - Provide the single-transaction "upsert author + insert article" write.
//!
//! # Invariants
//! - Fetches are ordered by `created_at DESC, id DESC`.
//! - Count and fetch share the same filter predicates; only the fetch applies
//!   the cursor bound.
//! - Reads decode persisted rows as-is; write-time validation is not re-run.
//! - Author matching folds Unicode case on both sides before `LIKE`.

use crate::db::DbError;
use crate::model::article::{Article, ArticleId, ArticleValidationError, Author, NewArticle};
use crate::search::fts::build_match_expression;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ARTICLE_SELECT_SQL: &str = "SELECT
    a.id AS id,
    a.title AS title,
    a.body AS body,
    a.author_id AS author_id,
    a.created_at AS created_at,
    au.id AS author_pk,
    au.name AS author_name
FROM articles a
JOIN authors au ON au.id = a.author_id
WHERE 1 = 1";

const FOLD_CASE_FUNCTION: &str = "pressroom_fold_case";

const ARTICLE_COUNT_SQL: &str = "SELECT COUNT(*)
FROM articles a
JOIN authors au ON au.id = a.author_id
WHERE 1 = 1";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for article persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ArticleValidationError),
    Db(DbError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Returns whether the store itself was unreachable, as opposed to a
    /// statement failing against a reachable store.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Db(err) => err.is_unavailable(),
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted article data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ArticleValidationError> for RepoError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Normalized filter predicates shared by count and fetch.
///
/// Blank values are stored as `None`; construct through [`ArticleFilter::new`]
/// so trimming happens once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    text: Option<String>,
    author: Option<String>,
}

impl ArticleFilter {
    pub fn new(text: Option<&str>, author: Option<&str>) -> Self {
        Self {
            text: normalize_filter_value(text),
            author: normalize_filter_value(author),
        }
    }

    /// Free-text query over title and body.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Case-insensitive author name substring.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    fn push_predicates(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        if let Some(text) = self.text() {
            match build_match_expression(text) {
                Some(match_expr) => {
                    sql.push_str(
                        " AND a.id IN (
                            SELECT rowid FROM articles_fts WHERE articles_fts MATCH ?
                        )",
                    );
                    bind_values.push(Value::Text(match_expr));
                }
                None => sql.push_str(" AND 0 = 1"),
            }
        }

        if let Some(author) = self.author() {
            sql.push_str(&format!(
                " AND {FOLD_CASE_FUNCTION}(au.name) LIKE ? ESCAPE '\\'"
            ));
            bind_values.push(Value::Text(format!(
                "%{}%",
                escape_like(&fold_case(author))
            )));
        }
    }
}

/// Exclusive keyset bound: rows strictly after this position in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorBound {
    pub id: ArticleId,
    pub created_at: i64,
}

impl CursorBound {
    fn push_predicate(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        sql.push_str(" AND (a.created_at < ? OR (a.created_at = ? AND a.id < ?))");
        bind_values.push(Value::Integer(self.created_at));
        bind_values.push(Value::Integer(self.created_at));
        bind_values.push(Value::Integer(self.id));
    }
}

/// Store capability consumed by the paginated query engine.
pub trait ArticleStore {
    /// Counts all articles matching `filter`, ignoring any cursor window.
    fn count_articles(&self, filter: &ArticleFilter) -> RepoResult<u64>;
    /// Fetches at most `limit` articles matching `filter` after `after`,
    /// in canonical order, joined with their author.
    fn query_articles(
        &self,
        filter: &ArticleFilter,
        limit: u32,
        after: Option<CursorBound>,
    ) -> RepoResult<Vec<Article>>;
    /// Upserts the author by name and inserts the article atomically.
    fn insert_article(&self, article: &NewArticle) -> RepoResult<Article>;
}

impl<S: ArticleStore + ?Sized> ArticleStore for &S {
    fn count_articles(&self, filter: &ArticleFilter) -> RepoResult<u64> {
        (**self).count_articles(filter)
    }

    fn query_articles(
        &self,
        filter: &ArticleFilter,
        limit: u32,
        after: Option<CursorBound>,
    ) -> RepoResult<Vec<Article>> {
        (**self).query_articles(filter, limit, after)
    }

    fn insert_article(&self, article: &NewArticle) -> RepoResult<Article> {
        (**self).insert_article(article)
    }
}

/// SQLite-backed article store.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Registers the case-folding SQL function used by the author filter on
    /// `conn`.
    ///
    /// # Errors
    /// - [`RepoError::MissingRequiredTable`] when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in ["authors", "articles", "articles_fts"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        register_fold_case(conn)?;
        Ok(Self { conn })
    }
}

impl ArticleStore for SqliteArticleRepository<'_> {
    fn count_articles(&self, filter: &ArticleFilter) -> RepoResult<u64> {
        let mut sql = String::from(ARTICLE_COUNT_SQL);
        let mut bind_values = Vec::new();
        filter.push_predicates(&mut sql, &mut bind_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative article count `{count}`")))
    }

    fn query_articles(
        &self,
        filter: &ArticleFilter,
        limit: u32,
        after: Option<CursorBound>,
    ) -> RepoResult<Vec<Article>> {
        let mut sql = String::from(ARTICLE_SELECT_SQL);
        let mut bind_values = Vec::new();
        filter.push_predicates(&mut sql, &mut bind_values);
        if let Some(bound) = after {
            bound.push_predicate(&mut sql, &mut bind_values);
        }

        sql.push_str(" ORDER BY a.created_at DESC, a.id DESC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }

    fn insert_article(&self, article: &NewArticle) -> RepoResult<Article> {
        let tx = self.conn.unchecked_transaction()?;

        let author_id: i64 = tx.query_row(
            "INSERT INTO authors (name) VALUES (?1)
             ON CONFLICT (name) DO UPDATE SET name = excluded.name
             RETURNING id;",
            [article.author_name()],
            |row| row.get(0),
        )?;

        let (id, created_at): (i64, i64) = tx.query_row(
            "INSERT INTO articles (title, body, author_id)
             VALUES (?1, ?2, ?3)
             RETURNING id, created_at;",
            params![article.title(), article.body(), author_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        tx.commit()?;

        Ok(Article {
            id,
            title: article.title().to_string(),
            body: article.body().to_string(),
            author_id,
            author: Author {
                id: author_id,
                name: article.author_name().to_string(),
            },
            created_at,
        })
    }
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let author_id: i64 = row.get("author_id")?;
    let author_pk: i64 = row.get("author_pk")?;
    if author_id != author_pk {
        return Err(RepoError::InvalidData(format!(
            "article author_id `{author_id}` joined to author `{author_pk}`"
        )));
    }

    Ok(Article {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        author_id,
        author: Author {
            id: author_pk,
            name: row.get("author_name")?,
        },
        created_at: row.get("created_at")?,
    })
}

fn normalize_filter_value(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

// SQLite `LIKE` folds ASCII only.
fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

fn register_fold_case(conn: &Connection) -> RepoResult<()> {
    conn.create_scalar_function(
        FOLD_CASE_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|value| fold_case(&value)))
        },
    )?;
    Ok(())
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{escape_like, fold_case, ArticleFilter};

    #[test]
    fn filter_trims_and_drops_blank_values() {
        let filter = ArticleFilter::new(Some("  rust  "), Some("   "));
        assert_eq!(filter.text(), Some("rust"));
        assert_eq!(filter.author(), None);
        assert_eq!(ArticleFilter::new(None, None), ArticleFilter::default());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Alice"), "Alice");
    }

    #[test]
    fn fold_case_lowers_non_ascii_letters() {
        assert_eq!(fold_case("ÉLODIE Durand"), "élodie durand");
        assert_eq!(fold_case("Ärger"), "ärger");
    }
}
