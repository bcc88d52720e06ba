//! Cached query façade: TTL store in front of single-flight coordination.
//!
//! # Architecture
//!
//! ```text
//! pipeline ──► QueryCache::fetch_cached
//!                 ├─ TtlStore::read (fresh?) ──► return
//!                 └─ Coordinator::coordinate_unless
//!                       ├─ join pending fetch
//!                       └─ spawn loader ──► TtlStore::write ──► all waiters
//! ```
//!
//! The fast path never touches the coordinator. On a miss, the cache is
//! re-checked under the coordinator's registry lock before a fetch is
//! registered, and a successful fetch writes the store before its
//! registration is removed. Together this gives at most one outstanding
//! fetch per key, and a successful result is visible to later callers for
//! up to their `max_age`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::flight::Coordinator;
use super::ttl::TtlStore;
use crate::Result;
use crate::telemetry;

/// TTL store and coordinator composed into one read-through operation.
///
/// Cloning is cheap and clones share state.
pub struct QueryCache<V> {
    store: Arc<TtlStore<V>>,
    coordinator: Coordinator<V>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a façade with a fresh store bounded at `max_entries`.
    pub fn new(max_entries: usize) -> Self {
        Self::from_parts(
            Arc::new(TtlStore::with_max_entries(max_entries)),
            Coordinator::new(),
        )
    }

    /// Compose an existing store and coordinator.
    pub fn from_parts(store: Arc<TtlStore<V>>, coordinator: Coordinator<V>) -> Self {
        Self { store, coordinator }
    }

    /// Return the cached value for `key` if fresh, else coordinate exactly
    /// one `loader` run and cache its successful result.
    ///
    /// Failures are returned to every waiter and are not cached.
    pub async fn fetch_cached<F, Fut>(&self, key: &str, max_age: Duration, loader: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let category = telemetry::category(key);
        if let Some(value) = self.store.read(key, max_age) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "category" => category).increment(1);
            debug!(key, "cache hit");
            return Ok(value);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "category" => category).increment(1);
        debug!(key, "cache miss");

        let store = Arc::clone(&self.store);
        let owned_key = key.to_owned();
        self.coordinator
            .coordinate_unless(
                key,
                || self.store.read(key, max_age),
                move || {
                    let fetch = loader();
                    async move {
                        let value = fetch.await?;
                        store.write(&owned_key, value.clone());
                        Ok(value)
                    }
                },
            )
            .await
    }

    /// The underlying TTL store.
    pub fn store(&self) -> &TtlStore<V> {
        &self.store
    }

    /// The underlying coordinator.
    pub fn coordinator(&self) -> &Coordinator<V> {
        &self.coordinator
    }
}
