//! Cache Module
//!
//! Provides in-memory caching with TTL expiration: the heap-indexed store used
//! by the active cache and the passive [`LazyCache`] alternative.

mod entry;
mod heap;
mod lazy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use crate::error::Result;

// Re-export public types
pub use entry::{expiration_after, Entry, MAX_TTL};
pub use heap::{EntryId, ExpiryHeap};
pub use lazy::LazyCache;
pub use stats::{CacheStats, StatsCounters};
pub use store::CacheStore;

// == TTL Store ==
/// Common contract of the expiration policies.
///
/// Lets callers swap the active [`TtlCache`](crate::TtlCache) and the passive
/// [`LazyCache`] behind one generic bound.
pub trait TtlStore<K, V> {
    /// Stores `value` under `key`; a zero `ttl` means the default TTL.
    fn set(&self, key: K, value: V, ttl: Duration);

    /// Returns the live value for `key`, or `CacheError::NotFound`.
    fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Removes `key` if present.
    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Number of entries held in memory.
    fn len(&self) -> usize;

    /// Returns true if no entries are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
