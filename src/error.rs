//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// `NotFound` is a plain unit variant so callers can compare against it
/// directly (`err == CacheError::NotFound`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// Key is absent, or present but already expired
    #[error("element not found")]
    NotFound,

    /// The active cache was built outside a Tokio runtime
    #[error("no Tokio runtime available to run the expiration sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
