//! Cache Handle
//!
//! Public facade composing the heap-indexed store with its expiration sweeper.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::cache::{CacheStats, CacheStore, TtlStore};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, SharedStore, SweeperHandle, SweeperState};

// == TTL Cache ==
/// Thread-safe TTL cache with active expiration.
///
/// `get` takes the store's shared lock; `set`, `delete` and every sweeper tick
/// take it exclusively. The sweeper runs on the Tokio runtime the cache was
/// built in and stops on [`shutdown`](Self::shutdown) or when the cache is
/// dropped.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use ttl_cache::{CacheError, TtlCache};
///
/// #[tokio::main]
/// async fn main() -> Result<(), CacheError> {
///     let cache = TtlCache::new(Duration::from_secs(60), Duration::from_secs(1))?;
///
///     cache.set("answer".to_string(), 42, Duration::ZERO);
///     assert_eq!(cache.get("answer"), Ok(42));
///
///     cache.shutdown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TtlCache<K, V> {
    store: SharedStore<K, V>,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its sweeper.
    ///
    /// # Errors
    /// Returns `CacheError::NoRuntime` when called outside a Tokio runtime.
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> Result<Self> {
        if Handle::try_current().is_err() {
            return Err(CacheError::NoRuntime);
        }

        let store = Arc::new(RwLock::new(CacheStore::new(default_ttl)));
        let sweeper = spawn_sweeper(Arc::clone(&store), sweep_interval);
        info!(
            "TTL cache initialized: default_ttl={:?}, sweep_interval={:?}",
            default_ttl, sweep_interval
        );

        Ok(Self {
            store,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.default_ttl, config.sweep_interval)
    }

    // == Set ==
    /// Stores a key-value pair; a zero `ttl` means the default TTL.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        self.write().set(key, value, ttl);
    }

    // == Get ==
    /// Retrieves a live value, or `CacheError::NotFound`.
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().get(key)
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key does nothing.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().delete(key);
    }

    /// Remaining lifetime of a live entry.
    pub fn ttl<Q>(&self, key: &Q) -> Result<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().ttl(key)
    }

    /// Number of stored entries, including expired ones awaiting a sweep.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.read().stats()
    }

    /// Lifecycle state of the sweeper; `Stopped` once shut down.
    pub fn sweeper_state(&self) -> SweeperState {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(SweeperState::Stopped, SweeperHandle::state)
    }

    // == Shutdown ==
    /// Stops the sweeper and waits until it has fully exited.
    ///
    /// The cache stays usable afterwards, but nothing is reclaimed any more:
    /// expired entries are only masked on read. A second call returns
    /// immediately.
    pub async fn shutdown(&self) {
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sweeper {
            Some(sweeper) => {
                sweeper.shutdown().await;
                info!("TTL cache shut down");
            }
            None => warn!("TTL cache shutdown requested more than once"),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheStore<K, V>> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheStore<K, V>> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.read().assert_consistent();
    }
}

impl<K, V> TtlStore<K, V> for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn set(&self, key: K, value: V, ttl: Duration) {
        TtlCache::set(self, key, value, ttl);
    }

    fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        TtlCache::get(self, key)
    }

    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        TtlCache::delete(self, key);
    }

    fn len(&self) -> usize {
        TtlCache::len(self)
    }
}
