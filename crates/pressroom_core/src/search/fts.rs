//! FTS5 match-expression builder for article text queries.
//!
//! # Invariants
//! - Every user term is quoted, so user input never reaches FTS5 as syntax.
//! - A query matches when all terms occur in the title, or all in the body.
//! - Terms the tokenizer would reduce to nothing are dropped before quoting.

use unicode_normalization::char::is_combining_mark;

const SEARCHABLE_COLUMNS: [&str; 2] = ["title", "body"];

/// Builds an FTS5 expression for `text`.
///
/// Returns `None` when `text` has no searchable term: blank input, or input
/// made only of punctuation or stray combining marks the tokenizer would
/// discard.
pub fn build_match_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .filter(|term| is_searchable_term(term))
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    let per_column = SEARCHABLE_COLUMNS
        .iter()
        .map(|column| {
            let scoped = terms
                .iter()
                .map(|term| format!("{column}:{term}"))
                .collect::<Vec<_>>();
            format!("({})", scoped.join(" AND "))
        })
        .collect::<Vec<_>>();

    Some(per_column.join(" OR "))
}

// `unicode61` strips diacritics, so a term needs a base letter or digit.
fn is_searchable_term(term: &str) -> bool {
    term.chars().any(|ch| ch.is_alphanumeric() && !is_combining_mark(ch))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}
