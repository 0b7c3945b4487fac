//! TTL Cache - An embedded in-memory key-value cache
//!
//! Every entry carries a time-to-live. Expired entries are reclaimed by a
//! background sweeper that walks a min-heap ordered by expiration time, so
//! memory stays bounded without caller intervention. A passive
//! [`LazyCache`](cache::LazyCache) that only masks expired entries on read is
//! provided behind the same [`TtlStore`](cache::TtlStore) contract.

pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod tasks;

pub use cache::{CacheStats, LazyCache, TtlStore};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use handle::TtlCache;
pub use tasks::SweeperState;
