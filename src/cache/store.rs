//! Cache Store Module
//!
//! Main cache engine pairing a hash index with an expiry heap.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::entry::expiration_after;
use crate::cache::{CacheStats, Entry, EntryId, ExpiryHeap, StatsCounters};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Cache storage with heap-ordered TTL expiration.
///
/// Every key in `index` points at exactly one entry in `heap`, so
/// `index.len() == heap.len()` at all times. The store itself is not
/// synchronized; callers share it behind a single `RwLock` so both structures
/// are always mutated together.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key to heap entry
    index: HashMap<K, EntryId>,
    /// Entries ordered by deadline
    heap: ExpiryHeap<K, V>,
    /// Performance statistics
    counters: StatsCounters,
    /// TTL applied when `set` receives a zero TTL
    default_ttl: Duration,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            index: HashMap::new(),
            heap: ExpiryHeap::new(),
            counters: StatsCounters::new(),
            default_ttl,
        }
    }

    /// Returns the TTL used when `set` receives a zero TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// A zero `ttl` is replaced by the default TTL. If the key already exists
    /// its entry is updated in place and re-heapified from its current slot.
    pub fn set(&mut self, key: K, value: V, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let expires_at = expiration_after(ttl);

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.heap.get_mut(id) {
                entry.value = value;
                entry.expires_at = expires_at;
                let slot = entry.slot();
                self.heap.fix(slot);
                return;
            }
        }

        let id = self.heap.push(Entry::new(key.clone(), value, expires_at));
        self.index.insert(key, id);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are reported as `NotFound` but left in place for the
    /// sweeper to reclaim.
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.live_entry(key) {
            Some(entry) => {
                self.counters.record_hit();
                Ok(entry.value.clone())
            }
            None => {
                self.counters.record_miss();
                Err(CacheError::NotFound)
            }
        }
    }

    // == TTL ==
    /// Returns the remaining lifetime of a live entry.
    pub fn ttl<Q>(&self, key: &Q) -> Result<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_entry(key)
            .map(Entry::time_remaining)
            .ok_or(CacheError::NotFound)
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key does nothing.
    pub fn delete<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(id) = self.index.remove(key) {
            if let Some(slot) = self.heap.get(id).map(Entry::slot) {
                self.heap.remove_at(slot);
            }
        }
    }

    // == Remove Expired ==
    /// Runs one sweep: pops every expired entry from the heap root.
    ///
    /// Stops at the first live root since everything below it expires later.
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        while self
            .heap
            .peek_min()
            .is_some_and(|entry| entry.is_expired_at(now))
        {
            let Some(entry) = self.heap.pop() else {
                break;
            };
            self.index.remove(&entry.key);
            removed += 1;
        }

        self.counters.record_sweep();
        self.counters.record_expired(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.index.len())
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn live_entry<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .and_then(|&id| self.heap.get(id))
            .filter(|entry| !entry.is_expired())
    }

    /// Asserts that the index and the heap agree and the heap is ordered.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.heap.len(), "index/heap size mismatch");
        assert!(self.heap.is_valid(), "heap order or slot violated");
        for (key, &id) in &self.index {
            let entry = self.heap.get(id).expect("indexed entry missing from heap");
            assert!(entry.key == *key, "index points at a different key");
        }
    }
}
