//! Connection shape for paginated article reads.

use crate::model::article::Article;
use crate::pagination::cursor::encode_cursor;
use serde::Serialize;

/// One article plus the cursor naming its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleEdge {
    pub node: Article,
    pub cursor: String,
}

impl ArticleEdge {
    pub fn new(node: Article) -> Self {
        let cursor = encode_cursor(node.id, node.created_at);
        Self { node, cursor }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    /// `true` whenever the request carried a cursor; not checked against the store.
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Bounded, ordered page of articles with page metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleConnection {
    pub edges: Vec<ArticleEdge>,
    pub page_info: PageInfo,
    /// Matches for the filters alone, ignoring the cursor window.
    pub total_count: u64,
}

impl ArticleConnection {
    /// Assembles a connection from an already trimmed, canonically ordered page.
    pub fn from_page(
        articles: Vec<Article>,
        has_next_page: bool,
        has_previous_page: bool,
        total_count: u64,
    ) -> Self {
        let edges = articles.into_iter().map(ArticleEdge::new).collect::<Vec<_>>();
        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        };

        Self {
            edges,
            page_info,
            total_count,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Article> {
        self.edges.iter().map(|edge| &edge.node)
    }
}
