//! Configuration loading for the courtside CLI.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.courtside/config.toml` (user)
//! 3. `/etc/courtside/config.toml` (system)
//!
//! No file at all is fine: store settings then come from `SUPABASE_URL` and
//! `SUPABASE_ANON_KEY`, and the cache uses its defaults.
//!
//! ```toml
//! [store]
//! url = "https://example.supabase.co"
//! anon_key = "..."
//!
//! [cache]
//! max_entries = 500
//!
//! [cache.ttl_secs]
//! active_players = 30
//! full_player_history = 3600
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{CachePolicy, QueryCategory};
use crate::store::StoreConfig;
use crate::{CourtsideError, Result};

/// CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub cache: CacheSection,
}

/// Remote store settings. Missing values fall back to the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
}

/// Cache sizing and per-category maximum ages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSection {
    /// Maximum cached entries (default: 300).
    #[serde(default)]
    pub max_entries: Option<usize>,
    /// Rows per page for paginated walks (default: 1000).
    #[serde(default)]
    pub page_size: Option<usize>,
    /// Row cap for full career history (default: 5000).
    #[serde(default)]
    pub full_history_max_rows: Option<usize>,
    /// Maximum age overrides in seconds, by category name.
    #[serde(default)]
    pub ttl_secs: HashMap<String, u64>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist; otherwise a missing file yields the
    /// default configuration.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CourtsideError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            CourtsideError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(CourtsideError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".courtside").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/courtside/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Store settings: file values first, then the environment.
    pub fn store_config(&self) -> Result<StoreConfig> {
        StoreConfig::resolve_with_env(self.store.url.clone(), self.store.anon_key.clone())
    }

    /// Build and validate the cache policy.
    pub fn cache_policy(&self) -> Result<CachePolicy> {
        let mut policy = CachePolicy::new();
        if let Some(n) = self.cache.max_entries {
            policy = policy.max_entries(n);
        }
        if let Some(n) = self.cache.page_size {
            policy = policy.page_size(n);
        }
        if let Some(n) = self.cache.full_history_max_rows {
            policy = policy.full_history_max_rows(n);
        }
        for (name, secs) in &self.cache.ttl_secs {
            let category: QueryCategory = name.parse()?;
            policy = policy.ttl(category, Duration::from_secs(*secs));
        }
        policy.validate()?;
        Ok(policy)
    }
}
