//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default TTL applied when `set` is called with a zero TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Default interval between two sweeper ticks.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL used for entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Interval between background sweeps of expired entries
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 60)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep interval in milliseconds (default: 1000)
    ///
    /// Zero or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        }
    }

    /// Sets the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(60));
        assert_eq!(config.sweep_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_config_builder_chaining() {
        let config = CacheConfig::default()
            .with_default_ttl(Duration::from_secs(5))
            .with_sweep_interval(Duration::from_millis(250));
        assert_eq!(config.default_ttl, Duration::from_secs(5));
        assert_eq!(config.sweep_interval, Duration::from_millis(250));
    }

    // Single test touches the process environment to avoid races between tests.
    #[test]
    fn test_config_from_env() {
        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("CACHE_SWEEP_INTERVAL_MS");
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::set_var("CACHE_DEFAULT_TTL", "120");
        env::set_var("CACHE_SWEEP_INTERVAL_MS", "500");
        let config = CacheConfig::from_env();
        assert_eq!(config.default_ttl, Duration::from_secs(120));
        assert_eq!(config.sweep_interval, Duration::from_millis(500));

        env::set_var("CACHE_DEFAULT_TTL", "0");
        env::set_var("CACHE_SWEEP_INTERVAL_MS", "soon");
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("CACHE_SWEEP_INTERVAL_MS");
    }
}
