//! Lazy Cache Module
//!
//! Passive-expiration policy: no background worker, expiry is only checked on read.
//!
//! Reads never delete. An expired entry stays in memory until it is
//! overwritten, deleted, or reclaimed by an explicit [`LazyCache::purge_expired`]
//! call, so write-heavy, read-rare workloads grow without bound.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::entry::expiration_after;
use crate::cache::{CacheStats, StatsCounters, TtlStore};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

#[derive(Debug)]
struct LazyEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> LazyEntry<V> {
    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

// == Lazy Cache ==
/// Thread-safe TTL cache that masks expired entries on read.
#[derive(Debug)]
pub struct LazyCache<K, V> {
    entries: RwLock<HashMap<K, LazyEntry<V>>>,
    counters: StatsCounters,
    default_ttl: Duration,
}

impl<K, V> LazyCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            counters: StatsCounters::new(),
            default_ttl,
        }
    }

    /// Creates an empty cache from configuration. The sweep interval is unused.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_ttl)
    }

    /// Stores a key-value pair; a zero `ttl` means the default TTL.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let entry = LazyEntry {
            value,
            expires_at: expiration_after(ttl),
        };
        self.write().insert(key, entry);
    }

    /// Retrieves a live value. Expired entries report `NotFound` and are kept.
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let value = self
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone());

        match value {
            Some(value) => {
                self.counters.record_hit();
                Ok(value)
            }
            None => {
                self.counters.record_miss();
                Err(CacheError::NotFound)
            }
        }
    }

    /// Removes an entry by key. Deleting an absent key does nothing.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key);
    }

    /// Removes every expired entry with a full scan. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();
        drop(entries);

        self.counters.record_sweep();
        self.counters.record_expired(removed);
        debug!("Lazy purge: removed {} expired entries", removed);
        removed
    }

    /// Number of entries held in memory, expired ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, LazyEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, LazyEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> TtlStore<K, V> for LazyCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn set(&self, key: K, value: V, ttl: Duration) {
        LazyCache::set(self, key, value, ttl);
    }

    fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        LazyCache::get(self, key)
    }

    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        LazyCache::delete(self, key);
    }

    fn len(&self) -> usize {
        LazyCache::len(self)
    }
}
