//! Bounded TTL store for computed artifacts
//!
//! Entries expire lazily: an entry older than the TTL is removed when it is
//! next read. When full, inserting a new key evicts the single entry with the
//! oldest creation time (insertion recency, not access recency).

use crate::key::CacheKey;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Store sizing and expiry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_entries: usize,
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// Entry lifetime
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl_secs: 3600,
        }
    }
}

/// Stored value with bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Cached value
    pub value: T,
    /// Insertion time
    pub created_at: Instant,
    /// Number of successful reads
    pub hit_count: u64,
    seq: u64,
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of live entries
    pub entry_count: usize,
    /// Successful reads
    pub hits: u64,
    /// Reads of absent or expired keys
    pub misses: u64,
    /// Entries dropped for capacity
    pub evictions: u64,
    /// Entries dropped for age
    pub expirations: u64,
}

/// Keyed cache seam used by the pipeline
///
/// Implemented by [`CacheStore`]; tests and multi-instance deployments may
/// substitute their own implementation.
pub trait ResultCache<T>: Send + Sync + Debug {
    /// Fetch a live value
    fn get(&self, key: &CacheKey) -> Option<T>;

    /// Insert or overwrite a value
    fn set(&self, key: CacheKey, value: T);

    /// Whether a live value exists
    fn has(&self, key: &CacheKey) -> bool;

    /// Remove a value; returns whether it existed
    fn delete(&self, key: &CacheKey) -> bool;

    /// Remove every value
    fn clear(&self);
}

#[derive(Debug)]
struct StoreInner<T> {
    entries: HashMap<CacheKey, CacheEntry<T>>,
    next_seq: u64,
    stats: CacheStats,
}

/// In-process artifact store bounded by entry count and TTL
///
/// Access is serialized by an internal mutex. State is not shared between
/// processes; multi-instance deployments need an external store behind
/// [`ResultCache`].
#[derive(Debug)]
pub struct CacheStore<T> {
    inner: Mutex<StoreInner<T>>,
    max_entries: usize,
    ttl: Duration,
}

impl<T: Clone> CacheStore<T> {
    /// Create store; a zero capacity is treated as one
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                next_seq: 0,
                stats: CacheStats::default(),
            }),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    /// Create store from configuration
    #[inline]
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl())
    }

    /// Capacity
    #[inline]
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Entry lifetime
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a live value, counting a hit
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<T> {
        let mut inner = self.inner.lock();

        if self.expire_if_stale(&mut inner, key, now) {
            inner.stats.misses += 1;
            tracing::debug!(%key, "Cache entry expired");
            return None;
        }

        let StoreInner { entries, stats, .. } = &mut *inner;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.hit_count += 1;
                stats.hits += 1;
                Some(entry.value.clone())
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite a value
    pub fn set(&self, key: CacheKey, value: T) {
        self.set_at(key, value, Instant::now());
    }

    fn set_at(&self, key: CacheKey, value: T, now: Instant) {
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.max_entries {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.created_at, entry.seq))
                .map(|(k, _)| k.clone());

            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
                inner.stats.evictions += 1;
                tracing::debug!(evicted = %oldest, "Cache at capacity, evicted oldest entry");
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                hit_count: 0,
                seq,
            },
        );
        inner.stats.entry_count = inner.entries.len();
    }

    /// Whether a live value exists (does not count a hit)
    #[must_use]
    pub fn has(&self, key: &CacheKey) -> bool {
        self.has_at(key, Instant::now())
    }

    fn has_at(&self, key: &CacheKey, now: Instant) -> bool {
        let mut inner = self.inner.lock();
        if self.expire_if_stale(&mut inner, key, now) {
            return false;
        }
        inner.entries.contains_key(key)
    }

    /// Remove a value; returns whether it existed
    pub fn delete(&self, key: &CacheKey) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.entries.remove(key).is_some();
        inner.stats.entry_count = inner.entries.len();
        removed
    }

    /// Remove every value
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.stats.entry_count = 0;
    }

    /// Hit count for a key, without touching it
    #[must_use]
    pub fn hit_count(&self, key: &CacheKey) -> Option<u64> {
        self.inner.lock().entries.get(key).map(|e| e.hit_count)
    }

    /// Number of stored entries (expired ones included until read)
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entry_count: inner.entries.len(),
            ..inner.stats
        }
    }

    fn expire_if_stale(&self, inner: &mut StoreInner<T>, key: &CacheKey, now: Instant) -> bool {
        let stale = inner
            .entries
            .get(key)
            .is_some_and(|entry| now.saturating_duration_since(entry.created_at) > self.ttl);

        if stale {
            inner.entries.remove(key);
            inner.stats.expirations += 1;
            inner.stats.entry_count = inner.entries.len();
        }
        stale
    }
}

impl<T: Clone> Default for CacheStore<T> {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl<T> ResultCache<T> for CacheStore<T>
where
    T: Clone + Send + Debug,
{
    fn get(&self, key: &CacheKey) -> Option<T> {
        CacheStore::get(self, key)
    }

    fn set(&self, key: CacheKey, value: T) {
        CacheStore::set(self, key, value);
    }

    fn has(&self, key: &CacheKey) -> bool {
        CacheStore::has(self, key)
    }

    fn delete(&self, key: &CacheKey) -> bool {
        CacheStore::delete(self, key)
    }

    fn clear(&self) {
        CacheStore::clear(self);
    }
}
