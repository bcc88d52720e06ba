//! Pagination walker.
//!
//! Collects every row of an ordered query by issuing range requests of a
//! fixed page size until a page comes back short. Pages are requested
//! strictly in sequence; a failing page aborts the walk and the partial
//! rows are discarded.

use serde_json::Value;
use tracing::debug;

use super::{Query, RowStore, execute};
use crate::{CourtsideError, Result};

/// Outcome of a paginated walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageWalk {
    /// Concatenated rows, in page order.
    pub rows: Vec<Value>,
    /// Number of page requests issued.
    pub pages: usize,
    /// `true` when the walk stopped at the row cap with rows possibly left.
    pub truncated: bool,
}

/// Walk `query` page by page, stopping at a short page or at `max_rows`.
///
/// The query's own window is replaced by `from..=to` ranges of
/// `page_size` rows. The caller is responsible for giving the query a
/// deterministic ordering.
pub async fn fetch_pages(
    store: &dyn RowStore,
    query: &Query,
    page_size: usize,
    max_rows: Option<usize>,
) -> Result<PageWalk> {
    if page_size == 0 {
        return Err(CourtsideError::InvalidInput(
            "page size must be at least 1".to_string(),
        ));
    }

    let mut walk = PageWalk::default();
    loop {
        let from = walk.pages * page_size;
        let to = from + page_size - 1;
        let page = execute(store, &query.clone().range(from, to)).await?;
        walk.pages += 1;

        let len = page.len();
        walk.rows.extend(page);

        if let Some(cap) = max_rows
            && walk.rows.len() >= cap
        {
            walk.truncated = walk.rows.len() > cap || len == page_size;
            walk.rows.truncate(cap);
            break;
        }
        if len < page_size {
            break;
        }
    }

    debug!(
        table = %query.table,
        pages = walk.pages,
        rows = walk.rows.len(),
        truncated = walk.truncated,
        "paginated walk complete"
    );
    Ok(walk)
}

/// Walk every page of `query` with no row cap.
pub async fn fetch_all_pages(
    store: &dyn RowStore,
    query: &Query,
    page_size: usize,
) -> Result<Vec<Value>> {
    fetch_pages(store, query, page_size, None)
        .await
        .map(|walk| walk.rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Window};
    use serde_json::json;

    fn numbered(n: usize) -> MemoryStore {
        let rows = (0..n).map(|i| json!({"seq": i})).collect();
        MemoryStore::new().with_table("t", rows)
    }

    #[tokio::test]
    async fn exact_multiple_needs_trailing_empty_page() {
        let store = numbered(2_000);
        let query = Query::table("t").order("seq", true);
        let walk = fetch_pages(&store, &query, 1_000, None).await.unwrap();

        assert_eq!(walk.rows.len(), 2_000);
        assert_eq!(walk.pages, 3);
        assert!(!walk.truncated);
        let windows: Vec<_> = store.queries().iter().map(|q| q.window).collect();
        assert_eq!(
            windows,
            vec![
                Some(Window::Range { from: 0, to: 999 }),
                Some(Window::Range { from: 1_000, to: 1_999 }),
                Some(Window::Range { from: 2_000, to: 2_999 }),
            ]
        );
    }

    #[tokio::test]
    async fn short_page_ends_walk() {
        let store = numbered(2_500);
        let walk = fetch_pages(&store, &Query::table("t").order("seq", true), 1_000, None)
            .await
            .unwrap();
        assert_eq!(walk.rows.len(), 2_500);
        assert_eq!(walk.pages, 3);
        assert_eq!(walk.rows[2_499], json!({"seq": 2_499}));
    }

    #[tokio::test]
    async fn empty_table_is_one_request() {
        let store = numbered(0);
        let rows = fetch_all_pages(&store, &Query::table("t"), 1_000).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.query_count("t"), 1);
    }

    #[tokio::test]
    async fn row_cap_truncates() {
        let store = numbered(25);
        let query = Query::table("t").order("seq", true);
        let walk = fetch_pages(&store, &query, 10, Some(15)).await.unwrap();
        assert_eq!(walk.rows.len(), 15);
        assert_eq!(walk.pages, 2);
        assert!(walk.truncated);

        let exact = fetch_pages(&store, &query, 10, Some(25)).await.unwrap();
        assert_eq!(exact.rows.len(), 25);
        assert!(!exact.truncated);
    }

    #[tokio::test]
    async fn failure_discards_partial_rows() {
        let store = MemoryStore::new();
        let err = fetch_all_pages(&store, &Query::table("missing"), 10).await.unwrap_err();
        assert!(matches!(err, CourtsideError::Store { .. }));
    }

    #[tokio::test]
    async fn zero_page_size_rejected() {
        let store = numbered(1);
        let err = fetch_all_pages(&store, &Query::table("t"), 0).await.unwrap_err();
        assert!(matches!(err, CourtsideError::InvalidInput(_)));
        assert_eq!(store.query_count("t"), 0);
    }
}
