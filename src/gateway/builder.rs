//! Builder for configuring gateway instances

use std::sync::Arc;

use super::DataGateway;
use crate::cache::CachePolicy;
use crate::store::{PostgrestClient, RowStore, StoreConfig};
use crate::{CourtsideError, Result};

/// Main entry point for creating gateway instances.
pub struct Courtside;

impl Courtside {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> CourtsideBuilder {
        CourtsideBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// ```rust
/// # use courtside::{CachePolicy, Courtside};
/// # use courtside::store::MemoryStore;
/// let gateway = Courtside::builder()
///     .store(MemoryStore::new())
///     .policy(CachePolicy::new().max_entries(500))
///     .build()
///     .unwrap();
/// assert_eq!(gateway.policy().max_entries, 500);
/// ```
#[derive(Default)]
pub struct CourtsideBuilder {
    store: Option<Arc<dyn RowStore>>,
    store_config: Option<StoreConfig>,
    policy: CachePolicy,
}

impl CourtsideBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing row store.
    pub fn store(mut self, store: impl RowStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use an existing shared row store.
    pub fn shared_store(mut self, store: Arc<dyn RowStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Configure a PostgREST store.
    pub fn postgrest(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.store_config = Some(StoreConfig {
            url: url.into(),
            anon_key: anon_key.into(),
        });
        self
    }

    /// Configure a PostgREST store from resolved settings.
    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = Some(config);
        self
    }

    /// Set the cache policy.
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the gateway.
    ///
    /// An explicit store takes precedence over PostgREST settings.
    pub fn build(self) -> Result<DataGateway> {
        let store: Arc<dyn RowStore> = match (self.store, self.store_config) {
            (Some(store), _) => store,
            (None, Some(config)) => {
                let config = StoreConfig::resolve(Some(config.url), Some(config.anon_key))?;
                Arc::new(PostgrestClient::new(&config)?)
            }
            (None, None) => {
                return Err(CourtsideError::Configuration(
                    "no row store configured".to_string(),
                ));
            }
        };
        DataGateway::new(store, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryCategory;
    use crate::store::MemoryStore;
    use std::time::Duration;

    #[test]
    fn requires_a_store() {
        let err = Courtside::builder().build().unwrap_err();
        assert!(matches!(err, CourtsideError::Configuration(_)));
    }

    #[test]
    fn rejects_blank_postgrest_settings() {
        let err = Courtside::builder().postgrest("", "key").build().unwrap_err();
        assert!(err.to_string().contains("missing store url or anon key"));
    }

    #[test]
    fn rejects_invalid_policy() {
        let policy = CachePolicy::new().ttl(QueryCategory::FullPlayerHistory, Duration::from_secs(1));
        let err = Courtside::builder()
            .store(MemoryStore::new())
            .policy(policy)
            .build()
            .unwrap_err();
        assert!(matches!(err, CourtsideError::Configuration(_)));
    }

    #[test]
    fn explicit_store_wins() {
        let gateway = Courtside::builder()
            .postgrest("https://example.supabase.co", "anon")
            .store(MemoryStore::new())
            .build()
            .unwrap();
        assert_eq!(gateway.store().name(), "memory");
    }
}
