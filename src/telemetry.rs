//! Telemetry metric name constants.
//!
//! Centralised metric names for courtside operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `courtside_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `category`: cache key prefix (e.g. "activePlayers", "playerHistory")
//! - `table`: remote table queried (e.g. "darko_shiny_history")
//! - `status`: outcome: "ok" or "error"

/// Cache reads answered from a fresh entry.
///
/// Labels: `category`.
pub const CACHE_HITS_TOTAL: &str = "courtside_cache_hits_total";

/// Cache reads that found no fresh entry.
///
/// Labels: `category`.
pub const CACHE_MISSES_TOTAL: &str = "courtside_cache_misses_total";

/// Callers that joined an already in-flight fetch instead of starting one.
///
/// Labels: `category`.
pub const CACHE_COALESCED_TOTAL: &str = "courtside_cache_coalesced_total";

/// Entries removed to keep the store within its capacity bound.
pub const CACHE_EVICTIONS_TOTAL: &str = "courtside_cache_evictions_total";

/// Requests issued to the remote row store.
///
/// Labels: `table`, `status` ("ok" | "error").
pub const STORE_REQUESTS_TOTAL: &str = "courtside_store_requests_total";

/// Remote row store request duration in seconds.
///
/// Labels: `table`.
pub const STORE_REQUEST_DURATION_SECONDS: &str = "courtside_store_request_duration_seconds";

/// Category label for a cache key: everything before the first `:`.
pub(crate) fn category(key: &str) -> String {
    key.split(':').next().unwrap_or(key).to_owned()
}
