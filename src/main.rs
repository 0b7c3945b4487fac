//! TTL Cache demo
//!
//! Stores a value, reads it back, deletes it and shows the NotFound path.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{CacheConfig, CacheError, TtlCache};

/// Entry point for the TTL cache demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, which starts its sweeper
/// 4. Run a set / get / delete round trip
/// 5. Print statistics and shut the sweeper down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: default_ttl={:?}, sweep_interval={:?}",
        config.default_ttl, config.sweep_interval
    );

    let cache = TtlCache::from_config(&config).context("failed to start cache")?;

    let key = "statue of liberty".to_string();
    cache.set(
        key.clone(),
        "40.68960612218659, -74.0456618251789".to_string(),
        Duration::from_secs(120),
    );

    let coordinates = cache.get(&key).context("freshly stored key missing")?;
    info!("{} is at {}", key, coordinates);

    cache.delete(&key);
    match cache.get(&key) {
        Err(CacheError::NotFound) => info!("{} no longer cached", key),
        Err(e) => return Err(e.into()),
        Ok(value) => warn!("{} still cached after delete: {}", key, value),
    }

    let stats = serde_json::to_string_pretty(&cache.stats())?;
    println!("{}", stats);

    cache.shutdown().await;
    info!("Demo complete");
    Ok(())
}
