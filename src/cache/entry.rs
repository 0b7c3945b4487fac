//! Cache Entry Module
//!
//! Defines the unit stored in the expiration heap and referenced by the hash index.

use std::time::Duration;

use tokio::time::Instant;

/// Upper bound applied to TTLs too large for the monotonic clock (~100 years).
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A single cache entry with its expiration deadline and heap position.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    /// The key this entry is indexed under
    pub key: K,
    /// The stored value, opaque to the cache
    pub value: V,
    /// Moment at which the entry stops being visible
    pub expires_at: Instant,
    /// Current position in the heap's backing array, maintained by the heap only
    pub(super) slot: usize,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates a new entry that is not yet placed in a heap.
    pub fn new(key: K, value: V, expires_at: Instant) -> Self {
        Self {
            key,
            value,
            expires_at,
            slot: 0,
        }
    }

    /// Returns the entry's current slot in the heap.
    pub fn slot(&self) -> usize {
        self.slot
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiration against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Returns the remaining lifetime, zero once expired.
    pub fn time_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// == Utility Functions ==
/// Computes the deadline `ttl` from now, saturating at [`MAX_TTL`].
pub fn expiration_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now + MAX_TTL)
}
