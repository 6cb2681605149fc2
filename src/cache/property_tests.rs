//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's behavior over generated operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, ManualClock};

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);
const NAMESPACES: [&str; 4] = ["channel", "playlists", "videos", "search"];

fn test_store() -> (CacheStore, ManualClock) {
    let clock = ManualClock::new(1_700_000_000_000);
    let store = CacheStore::new("prop", TEST_DEFAULT_TTL).with_clock(Arc::new(clock.clone()));
    (store, clock)
}

// == Strategies ==
fn namespace_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(NAMESPACES.to_vec()).prop_map(str::to_string)
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:=]{1,48}"
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { ns: String, key: String, value: Vec<u8> },
    Get { ns: String, key: String },
    Delete { ns: String, key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (namespace_strategy(), key_strategy(), value_strategy())
            .prop_map(|(ns, key, value)| CacheOp::Set { ns, key, value }),
        (namespace_strategy(), key_strategy()).prop_map(|(ns, key)| CacheOp::Get { ns, key }),
        (namespace_strategy(), key_strategy()).prop_map(|(ns, key)| CacheOp::Delete { ns, key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a value and reading it back before expiry returns the same bytes.
    #[test]
    fn prop_roundtrip_storage(
        ns in namespace_strategy(),
        key in key_strategy(),
        value in value_strategy(),
        ttl_secs in 1u64..86_400,
    ) {
        let (mut store, _) = test_store();

        store.set(&ns, &key, value.clone(), Some(Duration::from_secs(ttl_secs)));
        prop_assert_eq!(store.get(&ns, &key), Some(value));
    }

    // A second write to the same key wins and does not grow the store.
    #[test]
    fn prop_overwrite_semantics(
        ns in namespace_strategy(),
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy(),
    ) {
        let (mut store, _) = test_store();

        store.set(&ns, &key, value1, None);
        store.set(&ns, &key, value2.clone(), None);

        prop_assert_eq!(store.get(&ns, &key), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }

    // Once the TTL has elapsed the entry is gone from reads and from storage.
    #[test]
    fn prop_expired_entries_never_returned(
        ns in namespace_strategy(),
        key in key_strategy(),
        value in value_strategy(),
        ttl_secs in 0u64..3_600,
        extra_ms in 0u64..10_000,
    ) {
        let (mut store, clock) = test_store();

        store.set(&ns, &key, value, Some(Duration::from_secs(ttl_secs)));
        clock.advance_ms(ttl_secs * 1000 + extra_ms);

        prop_assert_eq!(store.get(&ns, &key), None);
        prop_assert_eq!(store.namespace_len(&ns), 0);
        prop_assert!(store.is_empty());
    }

    // Clearing a namespace leaves same-named keys in other namespaces readable.
    #[test]
    fn prop_clear_isolates_namespaces(
        keys in prop::collection::hash_set(key_strategy(), 1..20),
        target in namespace_strategy(),
    ) {
        let (mut store, _) = test_store();

        for ns in NAMESPACES {
            for key in &keys {
                store.set(ns, key, ns.as_bytes().to_vec(), None);
            }
        }

        prop_assert_eq!(store.clear(&target), keys.len());

        for ns in NAMESPACES {
            for key in &keys {
                let got = store.get(ns, key);
                if ns == target {
                    prop_assert_eq!(got, None);
                } else {
                    prop_assert_eq!(got, Some(ns.as_bytes().to_vec()));
                }
            }
        }
    }

    // Hits, misses and size match a simple model of the store.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (mut store, _) = test_store();
        let mut model: HashMap<(String, String), Vec<u8>> = HashMap::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Set { ns, key, value } => {
                    store.set(&ns, &key, value.clone(), None);
                    model.insert((ns, key), value);
                }
                CacheOp::Get { ns, key } => {
                    let got = store.get(&ns, &key);
                    let expected = model.get(&(ns, key)).cloned();
                    if got.is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                    prop_assert_eq!(got, expected);
                }
                CacheOp::Delete { ns, key } => {
                    let removed = store.delete(&ns, &key);
                    prop_assert_eq!(removed, model.remove(&(ns, key)).is_some());
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.size, model.len());
        prop_assert_eq!(stats.namespaces.values().sum::<usize>(), model.len());
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error maps to a JSON body with a string "error" field.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CatalogError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CatalogError::InvalidArgument(error_msg.clone()),
            CatalogError::NotFound(error_msg.clone()),
            CatalogError::UpstreamUnavailable {
                endpoint: "search".to_string(),
                message: error_msg.clone(),
            },
            CatalogError::Internal(error_msg.clone()),
        ];

        let rt = tokio::runtime::Runtime::new().unwrap();

        for error in error_variants {
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = rt.block_on(async { to_bytes(response.into_body(), usize::MAX).await.unwrap() });
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

            let error_str = json.get("error").and_then(|v| v.as_str());
            prop_assert!(error_str.is_some(), "'error' field should be a string");
            prop_assert!(error_str.unwrap().contains(&error_msg));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent tasks sharing one locked store always see whole values.
    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        use tokio::sync::RwLock;

        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let (store, _) = test_store();
            let store = Arc::new(RwLock::new(store));
            let mut handles = vec![];

            for op in operations {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    let mut cache = store.write().await;
                    match op {
                        CacheOp::Set { ns, key, value } => {
                            cache.set(&ns, &key, value, None);
                            Ok::<_, String>(())
                        }
                        CacheOp::Get { ns, key } => {
                            if let Some(value) = cache.get(&ns, &key) {
                                if value.len() > 256 {
                                    return Err(format!("value for '{ns}/{key}' is corrupted"));
                                }
                            }
                            Ok(())
                        }
                        CacheOp::Delete { ns, key } => {
                            cache.delete(&ns, &key);
                            Ok(())
                        }
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            let cache = store.read().await;
            let stats = cache.stats();
            prop_assert_eq!(stats.namespaces.values().sum::<usize>(), stats.size);
            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate));

            Ok(())
        })?;
    }
}
