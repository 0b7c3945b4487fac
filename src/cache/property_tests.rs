//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a simple model under random
//! operation sequences, with Tokio's paused clock standing in for real time.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheStore, LazyCache};
use crate::error::CacheError;
use crate::TtlCache;

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(60);

// == Strategies ==
/// Small key pool so sequences hit the same keys repeatedly
fn key_strategy() -> impl Strategy<Value = String> {
    (0u8..8).prop_map(|n| format!("key{}", n))
}

/// TTLs in milliseconds, zero included to exercise the default
fn ttl_strategy() -> impl Strategy<Value = Duration> {
    prop_oneof![
        1 => Just(Duration::ZERO),
        9 => (1u64..3_000).prop_map(Duration::from_millis),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32, ttl: Duration },
    Get { key: String },
    Delete { key: String },
    Advance { millis: u64 },
    Sweep,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), any::<u32>(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::Set { key, value, ttl }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        2 => (0u64..2_000).prop_map(|millis| CacheOp::Advance { millis }),
        1 => Just(CacheOp::Sweep),
    ]
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of set/delete/sweep operations the heap stays ordered,
    // every entry's slot matches its position, heap size equals index size,
    // and reads agree with a map of key -> (value, deadline).
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        paused_runtime().block_on(async {
            let mut store: CacheStore<String, u32> = CacheStore::new(TEST_DEFAULT_TTL);
            let mut model: HashMap<String, (u32, Instant)> = HashMap::new();

            for op in ops {
                match op {
                    CacheOp::Set { key, value, ttl } => {
                        let effective = if ttl.is_zero() { TEST_DEFAULT_TTL } else { ttl };
                        model.insert(key.clone(), (value, Instant::now() + effective));
                        store.set(key, value, ttl);
                    }
                    CacheOp::Get { key } => {
                        let expected = model
                            .get(&key)
                            .filter(|(_, deadline)| Instant::now() < *deadline)
                            .map(|(value, _)| *value)
                            .ok_or(CacheError::NotFound);
                        prop_assert_eq!(store.get(&key), expected);
                    }
                    CacheOp::Delete { key } => {
                        model.remove(&key);
                        store.delete(&key);
                    }
                    CacheOp::Advance { millis } => {
                        tokio::time::advance(Duration::from_millis(millis)).await;
                    }
                    CacheOp::Sweep => {
                        let now = Instant::now();
                        let before = model.len();
                        model.retain(|_, (_, deadline)| now < *deadline);
                        prop_assert_eq!(store.remove_expired(), before - model.len());
                    }
                }

                store.assert_consistent();
                prop_assert_eq!(store.len(), model.len());
            }
            Ok(())
        })?;
    }

    // Storing a pair and reading it back before expiry returns the same value,
    // for both expiration policies.
    #[test]
    fn prop_roundtrip_storage(key in "[a-zA-Z0-9_]{1,64}", value in any::<u64>()) {
        let lazy = LazyCache::new(TEST_DEFAULT_TTL);
        lazy.set(key.clone(), value, Duration::from_secs(30));
        prop_assert_eq!(lazy.get(&key), Ok(value));

        let mut store = CacheStore::new(TEST_DEFAULT_TTL);
        store.set(key.clone(), value, Duration::from_secs(30));
        prop_assert_eq!(store.get(&key), Ok(value));
    }

    // Refreshing keys never duplicates heap slots: size tracks distinct keys
    // and the last write wins.
    #[test]
    fn prop_refresh_never_duplicates(
        writes in prop::collection::vec((key_strategy(), any::<u32>(), ttl_strategy()), 1..100)
    ) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);
        let mut last: HashMap<String, u32> = HashMap::new();

        for (key, value, ttl) in writes {
            last.insert(key.clone(), value);
            store.set(key, value, ttl + Duration::from_secs(60));
            prop_assert_eq!(store.len(), last.len());
        }

        store.assert_consistent();
        for (key, value) in &last {
            prop_assert_eq!(store.get(key), Ok(*value));
        }
    }

    // Deleting absent or already-deleted keys leaves the rest untouched.
    #[test]
    fn prop_delete_is_idempotent(
        keys in prop::collection::hash_set(key_strategy(), 1..5),
        victim in key_strategy()
    ) {
        let mut store = CacheStore::new(TEST_DEFAULT_TTL);
        for key in &keys {
            store.set(key.clone(), key.len(), Duration::ZERO);
        }

        store.delete(&victim);
        let after_first = store.len();
        store.delete(&victim);

        prop_assert_eq!(store.len(), after_first);
        prop_assert_eq!(after_first, keys.len() - usize::from(keys.contains(&victim)));
        prop_assert_eq!(store.get(&victim), Err(CacheError::NotFound));
        store.assert_consistent();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    // N parallel writers with distinct keys followed by N parallel readers:
    // every read returns its own write.
    #[test]
    fn prop_concurrent_distinct_keys(count in 1usize..64) {
        tokio_test::block_on(async {
            let cache = TtlCache::new(TEST_DEFAULT_TTL, Duration::from_millis(10)).unwrap();

            std::thread::scope(|scope| {
                for i in 0..count {
                    let cache = &cache;
                    scope.spawn(move || cache.set(format!("key{}", i), i, Duration::ZERO));
                }
            });

            let results: Vec<_> = std::thread::scope(|scope| {
                let readers: Vec<_> = (0..count)
                    .map(|i| {
                        let cache = &cache;
                        scope.spawn(move || (i, cache.get(format!("key{}", i).as_str())))
                    })
                    .collect();
                readers.into_iter().map(|reader| reader.join().unwrap()).collect()
            });

            cache.assert_consistent();
            prop_assert_eq!(cache.len(), count);
            for (i, result) in results {
                prop_assert_eq!(result, Ok(i));
            }

            cache.shutdown().await;
            Ok(())
        })?;
    }
}
