//! In-process row store.
//!
//! Holds JSON rows per table and evaluates [`Query`] terms the way
//! PostgREST does: filters, then ordering, then the window, then the
//! projection. Every executed query is recorded so callers can assert on
//! what was asked for and how often.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Filter, FilterOp, Query, RowStore, Window};
use crate::{CourtsideError, Result};

/// Row store backed by in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Value>>,
    log: Mutex<Vec<Query>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table.
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    /// Queries executed so far, in order.
    pub fn queries(&self) -> Vec<Query> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Number of queries executed against `table`.
    pub fn query_count(&self, table: &str) -> usize {
        self.log
            .lock()
            .map(|log| log.iter().filter(|q| q.table == table).count())
            .unwrap_or(0)
    }

    fn record(&self, query: &Query) {
        if let Ok(mut log) = self.log.lock() {
            log.push(query.clone());
        }
    }

    fn evaluate(&self, query: &Query) -> Result<Vec<Value>> {
        let rows = self.tables.get(&query.table).ok_or_else(|| CourtsideError::Store {
            status: 404,
            message: format!("relation \"{}\" does not exist", query.table),
        })?;

        let mut matched: Vec<&Value> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .collect();

        if !query.order.is_empty() {
            matched.sort_by(|a, b| {
                for term in &query.order {
                    let ord = compare_nulls_last(field(a, &term.field), field(b, &term.field));
                    let ord = if term.ascending { ord } else { ord.reverse() };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let windowed: Vec<&Value> = match query.window {
            Some(Window::Limit(n)) => matched.into_iter().take(n).collect(),
            Some(Window::Range { from, to }) if to >= from => {
                matched.into_iter().skip(from).take(to - from + 1).collect()
            }
            Some(Window::Range { .. }) => Vec::new(),
            None => matched,
        };

        Ok(windowed
            .into_iter()
            .map(|row| project(row, &query.columns))
            .collect())
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        self.record(query);
        self.evaluate(query)
    }
}

fn field<'a>(row: &'a Value, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&Value::Null)
}

fn project(row: &Value, columns: &[String]) -> Value {
    if columns.is_empty() {
        return row.clone();
    }
    let mut out = Map::new();
    for column in columns {
        if let Some(value) = row.get(column) {
            out.insert(column.clone(), value.clone());
        }
    }
    Value::Object(out)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Compare two scalar values: numerically when both sides are numeric,
/// otherwise by their text form.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => Some(text(a).cmp(&text(b))),
        },
    }
}

/// Null sorts as the greatest value, matching PostgreSQL's default.
fn compare_nulls_last(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let actual = field(row, &filter.field);
    match filter.op {
        FilterOp::Eq => match (as_number(actual), as_number(&filter.value)) {
            (Some(x), Some(y)) => x == y,
            _ => !actual.is_null() && text(actual) == text(&filter.value),
        },
        FilterOp::Gte => compare(actual, &filter.value).is_some_and(|o| o != Ordering::Less),
        FilterOp::Lte => compare(actual, &filter.value).is_some_and(|o| o != Ordering::Greater),
        FilterOp::ILike => {
            !actual.is_null()
                && like(&text(actual).to_lowercase(), &text(&filter.value).to_lowercase())
        }
    }
}

/// SQL `LIKE` with `%` as the only wildcard.
fn like(haystack: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return haystack == pattern;
    }

    let (first, rest) = (parts[0], &parts[1..]);
    let Some(mut remaining) = haystack.strip_prefix(first) else {
        return false;
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return true,
    };
    for part in middle {
        match remaining.find(part) {
            Some(at) => remaining = &remaining[at + part.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}
