//! Remote row store abstraction.
//!
//! Pipelines describe what they need as a [`Query`] (table, projection,
//! filters, ordering, limit or range) and hand it to a [`RowStore`]. The
//! store returns raw JSON rows or an error value; decoding into typed rows
//! happens in [`decode_rows`], or [`decode_rows_lenient`] where a bad
//! row should be skipped rather than fail the query.
//!
//! Implementations:
//!
//! - [`PostgrestClient`]: PostgREST / Supabase REST over `reqwest`.
//! - [`MemoryStore`]: in-process rows with the same query semantics.

pub mod memory;
pub mod pages;
pub mod postgrest;

pub use memory::MemoryStore;
pub use pages::{PageWalk, fetch_all_pages, fetch_pages};
pub use postgrest::{PostgrestClient, StoreConfig};

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;
use crate::telemetry;

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `field = value`
    Eq,
    /// `field >= value`
    Gte,
    /// `field <= value`
    Lte,
    /// Case-insensitive pattern match; `%` matches any run of characters.
    ILike,
}

impl FilterOp {
    /// PostgREST operator name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::ILike => "ilike",
        }
    }
}

/// One `(field, op, value)` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

/// Row window: a plain limit, or an inclusive `from..=to` offset range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Limit(usize),
    Range { from: usize, to: usize },
}

/// A read against one table.
///
/// ```rust
/// # use courtside::store::Query;
/// let query = Query::table("darko_shiny_history")
///     .select(&["nba_id", "date", "dpm"])
///     .eq("nba_id", 2544)
///     .order("date", false)
///     .limit(500);
/// assert_eq!(query.filters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    /// Projected columns; empty means all columns.
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub window: Option<Window>,
}

impl Query {
    /// Start a query against `table` selecting all columns.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            window: None,
        }
    }

    /// Project an explicit column list.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    fn filter(mut self, field: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            field: field.to_owned(),
            op,
            value,
        });
        self
    }

    /// Equality filter.
    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value.into())
    }

    /// Lower-bound (inclusive) filter.
    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Gte, value.into())
    }

    /// Upper-bound (inclusive) filter.
    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lte, value.into())
    }

    /// Case-insensitive pattern filter (`%` wildcards).
    pub fn ilike(self, field: &str, pattern: impl Into<String>) -> Self {
        self.filter(field, FilterOp::ILike, Value::String(pattern.into()))
    }

    /// Append an ordering term.
    pub fn order(mut self, field: &str, ascending: bool) -> Self {
        self.order.push(Order {
            field: field.to_owned(),
            ascending,
        });
        self
    }

    /// Return at most `n` rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.window = Some(Window::Limit(n));
        self
    }

    /// Return rows `from..=to` (zero-based offsets).
    pub fn range(mut self, from: usize, to: usize) -> Self {
        self.window = Some(Window::Range { from, to });
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        for filter in &self.filters {
            write!(f, " {}={}.{}", filter.field, filter.op.as_str(), filter.value)?;
        }
        match self.window {
            Some(Window::Limit(n)) => write!(f, " limit={n}"),
            Some(Window::Range { from, to }) => write!(f, " range={from}-{to}"),
            None => Ok(()),
        }
    }
}

/// Abstract query capability of the remote relational store.
///
/// Implementations return an error value rather than panicking, and own
/// their timeouts.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Store name for logs (e.g. "postgrest", "memory").
    fn name(&self) -> &str;

    /// Execute `query`, returning matching rows as JSON objects.
    async fn query(&self, query: &Query) -> Result<Vec<Value>>;
}

/// Run `query` against `store`, emitting request metrics.
pub async fn execute(store: &dyn RowStore, query: &Query) -> Result<Vec<Value>> {
    let started = Instant::now();
    let result = store.query(query).await;
    let elapsed = started.elapsed().as_secs_f64();

    let status = if result.is_ok() { "ok" } else { "error" };
    metrics::counter!(telemetry::STORE_REQUESTS_TOTAL,
        "table" => query.table.clone(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::STORE_REQUEST_DURATION_SECONDS,
        "table" => query.table.clone(),
    )
    .record(elapsed);

    match &result {
        Ok(rows) => debug!(store = store.name(), %query, rows = rows.len(), "store query"),
        Err(e) => warn!(store = store.name(), %query, error = %e, "store query failed"),
    }
    result
}

/// Decode raw rows into `T`, failing on the first malformed row.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}

/// Decode raw rows into `T`, skipping rows that do not decode.
///
/// For row sets where one malformed record (say, a null `nba_id`) must
/// not take down the whole view. Each skipped row is logged.
pub fn decode_rows_lenient<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(table, error = %e, "skipping malformed row");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        debug!(table, skipped = total - decoded.len(), kept = decoded.len(), "rows skipped");
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn builder_accumulates_terms() {
        let query = Query::table("darko_shiny_history")
            .select(&["nba_id", "date"])
            .eq("active_roster", 1)
            .gte("date", "2024-01-01")
            .order("date", false)
            .order("nba_id", true)
            .range(0, 999);

        assert_eq!(query.columns, vec!["nba_id", "date"]);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].value, json!(1));
        assert_eq!(query.filters[1].op, FilterOp::Gte);
        assert_eq!(query.order.len(), 2);
        assert_eq!(query.window, Some(Window::Range { from: 0, to: 999 }));
    }

    #[test]
    fn later_window_replaces_earlier() {
        let query = Query::table("t").limit(5).range(10, 19);
        assert_eq!(query.window, Some(Window::Range { from: 10, to: 19 }));
    }

    #[test]
    fn display_summarises_query() {
        let query = Query::table("players").eq("nba_id", 7).limit(1);
        assert_eq!(query.to_string(), "players nba_id=eq.7 limit=1");
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        id: i64,
    }

    #[test]
    fn decode_rows_reports_bad_row() {
        let ok: Vec<Row> = decode_rows(vec![json!({"id": 1}), json!({"id": 2})]).unwrap();
        assert_eq!(ok.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

        let err = decode_rows::<Row>(vec![json!({"id": "x"})]).unwrap_err();
        assert!(matches!(err, crate::CourtsideError::DataError(_)));
    }

    #[test]
    fn lenient_decode_skips_bad_rows() {
        let rows: Vec<Row> = decode_rows_lenient(
            "players",
            vec![json!({"id": 1}), json!({"id": null}), json!({"id": "x"}), json!({"id": 4})],
        );
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 4]);
    }
}
