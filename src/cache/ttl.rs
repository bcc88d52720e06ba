//! Bounded, age-checked key/value store.
//!
//! Entries are stamped when written and checked against a caller-supplied
//! maximum age when read. Expiry is lazy: a stale entry is removed by the
//! read that discovers it, there is no background sweep.
//!
//! When a write of a new key would exceed the capacity bound, the
//! oldest-inserted entry is evicted first. This is insertion-order (FIFO)
//! eviction, not LRU: reads do not refresh an entry's position, and
//! overwriting an existing key keeps its original slot.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;

/// Default capacity bound.
pub const DEFAULT_MAX_ENTRIES: usize = 300;

/// A stored value together with the instant it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub written_at: Instant,
}

struct Slots<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Keys in insertion order; front is the next eviction candidate.
    order: VecDeque<String>,
}

impl<V> Slots<V> {
    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                self.order.remove(pos);
            }
        }
    }
}

/// Thread-safe bounded TTL store.
///
/// Reads, writes and evictions are serialised by one mutex, so two
/// concurrent writes of new keys near capacity cannot both skip eviction.
/// The lock is never held across an `.await`.
pub struct TtlStore<V> {
    slots: Mutex<Slots<V>>,
    max_entries: usize,
}

impl<V: Clone> TtlStore<V> {
    /// Create an empty store with the default capacity (300).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty store holding at most `max_entries` entries.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries: max_entries.max(1),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots<V>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the value for `key` if it was written no more than `max_age` ago.
    ///
    /// An entry older than `max_age` is deleted and `None` is returned.
    pub fn read(&self, key: &str, max_age: Duration) -> Option<V> {
        let mut slots = self.slots();
        let written_at = slots.entries.get(key)?.written_at;
        if written_at.elapsed() > max_age {
            slots.remove(key);
            debug!(key, "expired cache entry removed");
            return None;
        }
        slots.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite `key`, stamping it with the current time.
    ///
    /// If `key` is new and the store is full, the oldest-inserted entry is
    /// evicted first.
    pub fn write(&self, key: &str, value: V) {
        let mut slots = self.slots();
        let is_new = !slots.entries.contains_key(key);
        if is_new && slots.entries.len() >= self.max_entries {
            if let Some(oldest) = slots.order.pop_front() {
                slots.entries.remove(&oldest);
                metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(1);
                debug!(evicted = %oldest, "cache at capacity, evicted oldest entry");
            }
        }
        if is_new {
            slots.order.push_back(key.to_owned());
        }
        slots.entries.insert(
            key.to_owned(),
            CacheEntry {
                value,
                written_at: Instant::now(),
            },
        );
    }

    /// Remove `key` if present.
    pub fn invalidate(&self, key: &str) {
        self.slots().remove(key);
    }

    /// Evict all entries.
    pub fn clear(&self) {
        let mut slots = self.slots();
        slots.entries.clear();
        slots.order.clear();
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.slots().entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity bound.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Whether `key` currently has an entry (fresh or not).
    pub fn contains(&self, key: &str) -> bool {
        self.slots().entries.contains_key(key)
    }
}

impl<V: Clone> Default for TtlStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
