//! Data gateway: the aggregation pipelines.
//!
//! [`DataGateway`] owns one row store, one [`QueryCache`], and the
//! [`CachePolicy`]. Every pipeline goes through [`DataGateway::cached`],
//! which builds the `prefix:parameter` key, applies the category's maximum
//! age, and single-flights the loader. Loaders receive their own gateway
//! handle because they run on a detached task.
//!
//! | Pipeline | Module |
//! |----------|--------|
//! | latest date, active roster, player index, search, current, dimension | [`roster`] |
//! | bounded and full player history | [`history`] |
//! | longevity rows and trajectories | [`longevity`] |
//! | standings, simulation, win distribution, team bundle | [`team`] |

mod builder;
mod cached;
pub mod history;
pub mod longevity;
pub mod merge;
pub mod roster;
pub mod team;

pub use builder::{Courtside, CourtsideBuilder};
pub use cached::CachedValue;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use cached::Cacheable;

use crate::cache::{CachePolicy, QueryCache, QueryCategory};
use crate::store::{Query, RowStore, decode_rows_lenient, execute};
use crate::types::RatingRow;
use crate::{CourtsideError, Result};

/// Cached, single-flight access to the ratings store.
///
/// Cloning is cheap; clones share the store, cache, and policy.
#[derive(Clone)]
pub struct DataGateway {
    store: Arc<dyn RowStore>,
    cache: QueryCache<CachedValue>,
    policy: Arc<CachePolicy>,
}

impl fmt::Debug for DataGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGateway")
            .field("store", &self.store.name())
            .field("cached_entries", &self.cache.store().len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl DataGateway {
    /// Create a gateway over `store`, rejecting an unusable policy.
    pub fn new(store: Arc<dyn RowStore>, policy: CachePolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            store,
            cache: QueryCache::new(policy.max_entries),
            policy: Arc::new(policy),
        })
    }

    /// The backing row store.
    pub fn store(&self) -> &dyn RowStore {
        self.store.as_ref()
    }

    /// The shared query cache.
    pub fn cache(&self) -> &QueryCache<CachedValue> {
        &self.cache
    }

    /// The cache policy in effect.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Read-through a cached pipeline result.
    async fn cached<T, F, Fut>(
        &self,
        category: QueryCategory,
        parameter: impl fmt::Display,
        loader: F,
    ) -> Result<T>
    where
        T: Cacheable,
        F: FnOnce(DataGateway) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let key = category.key(parameter);
        let gateway = self.clone();
        let value = self
            .cache
            .fetch_cached(&key, self.policy.max_age(category), move || {
                let fetch = loader(gateway);
                async move { fetch.await.map(Cacheable::into_cached) }
            })
            .await?;

        T::from_cached(value).ok_or_else(|| {
            CourtsideError::DataError(format!("cache slot '{key}' holds an unexpected value type"))
        })
    }

    /// Execute `query` and decode rating rows, skipping malformed ones.
    async fn rating_rows(&self, query: &Query) -> Result<Vec<RatingRow>> {
        let rows = execute(self.store(), query).await?;
        Ok(decode_rows_lenient(&query.table, rows))
    }
}
