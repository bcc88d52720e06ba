//! Single-flight coordination of remote fetches.
//!
//! [`Coordinator`] keeps a registry of in-flight fetches keyed by cache key.
//! The first caller for a key starts the fetch; every caller that arrives
//! while it is pending awaits the same shared outcome instead of invoking
//! its own loader. The registration is removed when the fetch settles,
//! whether it succeeded or failed, so failures are never remembered and
//! the next caller starts a fresh fetch.
//!
//! Each fetch runs on its own tokio task. A caller that stops waiting does
//! not cancel the fetch: it runs to completion for the remaining waiters.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::debug;

use crate::telemetry;
use crate::{CourtsideError, Result};

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V>>>;
type Registry<V> = Arc<Mutex<HashMap<String, SharedFetch<V>>>>;

fn lock<V>(registry: &Registry<V>) -> MutexGuard<'_, HashMap<String, SharedFetch<V>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes a key from the registry when the owning fetch task ends,
/// including when the loader panics.
struct Deregister<V> {
    registry: Registry<V>,
    key: String,
}

impl<V> Drop for Deregister<V> {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Registry of in-flight fetches, at most one per key.
pub struct Coordinator<V> {
    pending: Registry<V>,
}

impl<V> Clone for Coordinator<V> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<V> Coordinator<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a coordinator with no pending fetches.
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Await the pending fetch for `key`, or start one with `loader`.
    ///
    /// `loader` is invoked only when no fetch for `key` is pending. It is
    /// called with the registry lock held, so it must only build its
    /// future: calling back into this coordinator before returning (rather
    /// than from inside the returned future) deadlocks.
    pub async fn coordinate<F, Fut>(&self, key: &str, loader: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.coordinate_unless(key, || None, loader).await
    }

    /// Like [`coordinate`](Self::coordinate), but first consults `settled`
    /// while holding the registry lock.
    ///
    /// A `Some` from `settled` is returned without registering anything.
    /// The cache façade passes a cache read here, so a fetch that settles
    /// between the caller's fast-path miss and its registration is observed
    /// rather than repeated.
    ///
    /// `settled` and `loader` both run under the registry lock. Neither
    /// may touch this coordinator synchronously; work that does belongs
    /// inside the future `loader` returns.
    pub async fn coordinate_unless<C, F, Fut>(&self, key: &str, settled: C, loader: F) -> Result<V>
    where
        C: FnOnce() -> Option<V>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let fetch = {
            let mut pending = lock(&self.pending);
            if let Some(existing) = pending.get(key) {
                metrics::counter!(
                    telemetry::CACHE_COALESCED_TOTAL,
                    "category" => telemetry::category(key),
                )
                .increment(1);
                debug!(key, "joining in-flight fetch");
                existing.clone()
            } else if let Some(value) = settled() {
                return Ok(value);
            } else {
                let guard = Deregister {
                    registry: Arc::clone(&self.pending),
                    key: key.to_owned(),
                };
                let task = loader();
                let handle = tokio::spawn(async move {
                    let _guard = guard;
                    task.await
                });
                let fetch = handle
                    .map(|joined| {
                        joined.unwrap_or_else(|e| {
                            Err(CourtsideError::DataError(format!("fetch task failed: {e}")))
                        })
                    })
                    .boxed()
                    .shared();
                pending.insert(key.to_owned(), fetch.clone());
                fetch
            }
        };
        fetch.await
    }

    /// Whether a fetch for `key` is currently pending.
    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.pending).contains_key(key)
    }

    /// Number of pending fetches.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl<V> Default for Coordinator<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
