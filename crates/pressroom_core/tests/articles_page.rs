use pressroom_core::db::open_db_in_memory;
use pressroom_core::{
    decode_cursor, encode_cursor, Article, ArticleConnection, ArticleInput, ArticleQueryError,
    ArticleService, ArticlesPageRequest, SqliteArticleRepository,
};
use rusqlite::{params, Connection};
use std::collections::HashSet;

fn create(
    service: &ArticleService<SqliteArticleRepository<'_>>,
    title: &str,
    author: &str,
) -> Article {
    service
        .create_article(&ArticleInput::new(title, format!("{title} body"), author))
        .unwrap()
}

/// Inserts an article with an explicit timestamp, bypassing the store default.
fn insert_at(conn: &Connection, title: &str, author: &str, created_at: i64) -> i64 {
    conn.execute(
        "INSERT INTO authors (name) VALUES (?1) ON CONFLICT (name) DO NOTHING;",
        [author],
    )
    .unwrap();
    conn.query_row(
        "INSERT INTO articles (title, body, author_id, created_at)
         SELECT ?1, ?2, id, ?3 FROM authors WHERE name = ?4
         RETURNING id;",
        params![title, format!("{title} body"), created_at, author],
        |row| row.get(0),
    )
    .unwrap()
}

fn page(first: Option<u32>, after: Option<&str>) -> ArticlesPageRequest {
    ArticlesPageRequest {
        first,
        after: after.map(str::to_string),
        ..ArticlesPageRequest::default()
    }
}

fn titles(connection: &ArticleConnection) -> Vec<String> {
    connection.nodes().map(|node| node.title.clone()).collect()
}

fn assert_canonical_order(connection: &ArticleConnection) {
    let keys = connection
        .nodes()
        .map(|node| (node.created_at, node.id))
        .collect::<Vec<_>>();
    for pair in keys.windows(2) {
        assert!(pair[0] > pair[1], "out of order: {:?} then {:?}", pair[0], pair[1]);
    }
}

#[test]
fn newest_first_with_total_count() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());
    create(&service, "First", "Ann");
    create(&service, "Second", "Ben");
    create(&service, "Third", "Cat");

    let result = service.get_articles_page(&page(Some(10), None)).unwrap();

    assert_eq!(titles(&result), vec!["Third", "Second", "First"]);
    assert_eq!(result.total_count, 3);
    assert!(!result.page_info.has_next_page);
    assert!(!result.page_info.has_previous_page);
    assert_canonical_order(&result);
}

#[test]
fn empty_store_returns_empty_page() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());

    let result = service
        .get_articles_page(&ArticlesPageRequest::default())
        .unwrap();

    assert!(result.edges.is_empty());
    assert_eq!(result.total_count, 0);
    assert!(!result.page_info.has_next_page);
    assert!(result.page_info.start_cursor.is_none());
    assert!(result.page_info.end_cursor.is_none());
}

#[test]
fn second_page_continues_after_first_without_overlap() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());
    for index in 1..=5 {
        create(&service, &format!("Article {index}"), "Alice");
    }

    let first = service.get_articles_page(&page(Some(2), None)).unwrap();
    assert_eq!(titles(&first), vec!["Article 5", "Article 4"]);
    assert!(first.page_info.has_next_page);
    assert_eq!(first.total_count, 5);

    let end_cursor = first.page_info.end_cursor.as_deref().unwrap();
    let second = service
        .get_articles_page(&page(Some(2), Some(end_cursor)))
        .unwrap();
    assert_eq!(titles(&second), vec!["Article 3", "Article 2"]);
    assert!(second.page_info.has_next_page);
    assert!(second.page_info.has_previous_page);
    assert_eq!(second.total_count, 5);

    let third = service
        .get_articles_page(&page(Some(2), second.page_info.end_cursor.as_deref()))
        .unwrap();
    assert_eq!(titles(&third), vec!["Article 1"]);
    assert!(!third.page_info.has_next_page);
}

#[test]
fn exact_page_boundary_has_no_next_page() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());
    for index in 1..=4 {
        create(&service, &format!("Article {index}"), "Alice");
    }

    let full = service.get_articles_page(&page(Some(4), None)).unwrap();
    assert_eq!(full.edges.len(), 4);
    assert!(!full.page_info.has_next_page);

    let short = service.get_articles_page(&page(Some(3), None)).unwrap();
    assert_eq!(short.edges.len(), 3);
    assert!(short.page_info.has_next_page);
}

#[test]
fn timestamp_dominates_id_and_ties_break_by_id() {
    let conn = open_db_in_memory().unwrap();
    let oldest = insert_at(&conn, "oldest", "Alice", 100);
    let tie_low = insert_at(&conn, "tie low id", "Alice", 200);
    let newest = insert_at(&conn, "newest", "Bob", 300);
    let tie_high = insert_at(&conn, "tie high id", "Bob", 200);
    let backdated = insert_at(&conn, "backdated", "Bob", 50);
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());

    let result = service
        .get_articles_page(&ArticlesPageRequest::default())
        .unwrap();

    let ids = result.nodes().map(|node| node.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![newest, tie_high, tie_low, oldest, backdated]);
    assert_canonical_order(&result);
}

#[test]
fn paging_through_timestamp_ties_has_no_gap_or_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let mut expected = Vec::new();
    for index in 0..7 {
        // Groups of identical timestamps exercise the id tie-breaker at page edges.
        let created_at = 1_000 + index / 3;
        expected.push(insert_at(&conn, &format!("post {index}"), "Alice", created_at));
    }
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());

    let mut seen = Vec::new();
    let mut after: Option<String> = None;
    loop {
        let result = service
            .get_articles_page(&page(Some(2), after.as_deref()))
            .unwrap();
        assert!(result.edges.len() <= 2);
        assert_eq!(result.total_count, 7);
        assert_canonical_order(&result);
        seen.extend(result.nodes().map(|node| node.id));
        if !result.page_info.has_next_page {
            break;
        }
        after = result.page_info.end_cursor.clone();
    }

    let mut canonical = expected.clone();
    canonical.sort_by_key(|id| {
        let index = expected.iter().position(|candidate| candidate == id).unwrap() as i64;
        (std::cmp::Reverse(1_000 + index / 3), std::cmp::Reverse(*id))
    });
    assert_eq!(seen, canonical);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 7);
}

#[test]
fn page_size_is_clamped() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());
    for index in 0..105 {
        insert_at(&conn, &format!("bulk {index}"), "Alice", 10_000 + index);
    }

    let capped = service.get_articles_page(&page(Some(1_000), None)).unwrap();
    assert_eq!(capped.edges.len(), 100);
    assert!(capped.page_info.has_next_page);
    assert_eq!(capped.total_count, 105);

    let defaulted = service.get_articles_page(&page(None, None)).unwrap();
    assert_eq!(defaulted.edges.len(), 10);

    let minimum = service.get_articles_page(&page(Some(0), None)).unwrap();
    assert_eq!(minimum.edges.len(), 1);
    assert!(minimum.page_info.has_next_page);
}

#[test]
fn edge_cursors_encode_each_row_position() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());
    let id = insert_at(&conn, "positioned", "Alice", 1_700_000_000);

    let result = service.get_articles_page(&page(None, None)).unwrap();

    let edge = &result.edges[0];
    assert_eq!(decode_cursor(&edge.cursor).unwrap(), (id, 1_700_000_000));
    assert_eq!(result.page_info.start_cursor.as_deref(), Some(edge.cursor.as_str()));
    assert_eq!(result.page_info.end_cursor.as_deref(), Some(edge.cursor.as_str()));
}

#[test]
fn crafted_cursor_for_missing_row_still_bounds_results() {
    let conn = open_db_in_memory().unwrap();
    let old = insert_at(&conn, "old", "Alice", 100);
    insert_at(&conn, "new", "Alice", 300);
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());

    let cursor = encode_cursor(9_999, 200);
    let result = service
        .get_articles_page(&page(None, Some(&cursor)))
        .unwrap();

    assert_eq!(result.nodes().map(|node| node.id).collect::<Vec<_>>(), vec![old]);
    assert_eq!(result.total_count, 2);
    assert!(result.page_info.has_previous_page);
}

#[test]
fn garbage_cursor_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());
    create(&service, "only", "Alice");

    for token in ["not-a-valid-token", "%%%", "MTI6YWJj", "MToyOjM"] {
        let err = service
            .get_articles_page(&page(None, Some(token)))
            .unwrap_err();
        assert!(
            matches!(err, ArticleQueryError::InvalidCursor(_)),
            "token {token} gave {err}"
        );
    }
}

#[test]
fn writes_between_pages_shift_count_but_not_window() {
    let conn = open_db_in_memory().unwrap();
    for index in 0..4 {
        insert_at(&conn, &format!("before {index}"), "Alice", 100 + index);
    }
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());

    let first = service.get_articles_page(&page(Some(2), None)).unwrap();
    assert_eq!(titles(&first), vec!["before 3", "before 2"]);
    assert_eq!(first.total_count, 4);

    insert_at(&conn, "late arrival", "Bob", 500);

    let second = service
        .get_articles_page(&page(Some(2), first.page_info.end_cursor.as_deref()))
        .unwrap();
    assert_eq!(titles(&second), vec!["before 1", "before 0"]);
    assert_eq!(second.total_count, 5);
}

#[test]
fn store_failure_surfaces_as_store_error() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::try_new(&conn).unwrap());
    conn.execute_batch("DROP TABLE articles_fts;").unwrap();

    let err = service
        .get_articles_page(&ArticlesPageRequest {
            query: Some("anything".to_string()),
            ..ArticlesPageRequest::default()
        })
        .unwrap_err();

    assert!(matches!(err, ArticleQueryError::Store(_)));
    assert!(!err.is_store_unavailable());
}
