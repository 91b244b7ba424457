//! TTL behavior through the store and the fetch façade.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use serde_json::json;
use strata_core::cache::{CachedFetcher, CacheStore};

#[tokio::test(start_paused = true)]
async fn entry_hits_until_ttl_then_misses() {
    let store = CacheStore::new();
    store.insert("k", json!("v"), Duration::from_secs(1));

    assert_eq!(store.get("k"), Some(json!("v")));

    tokio::time::advance(Duration::from_millis(1001)).await;
    assert_eq!(store.get("k"), None);
}

#[tokio::test(start_paused = true)]
async fn expired_key_is_refetched_through_the_facade() {
    let fetcher = Arc::new(CachedFetcher::new(Arc::new(CacheStore::new())));
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = Arc::clone(&calls);
        let value = fetcher
            .fetch_cached("k", Duration::from_secs(30), move || async move {
                Ok(json!(calls.fetch_add(1, Ordering::SeqCst) + 1))
            })
            .await
            .unwrap();
        // Second call is a cache hit; the counter stays at 1.
        assert_eq!(value, json!(1));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(31)).await;

    let calls_after = Arc::clone(&calls);
    let value = fetcher
        .fetch_cached("k", Duration::from_secs(30), move || async move {
            Ok(json!(calls_after.fetch_add(1, Ordering::SeqCst) + 1))
        })
        .await
        .unwrap();
    assert_eq!(value, json!(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn per_endpoint_ttls_are_independent() {
    let store = CacheStore::new();
    store.insert("contract_source_X", json!("source"), Duration::from_secs(3600));
    store.insert("contract_events_X", json!([]), Duration::from_secs(30));

    assert!(store.get("contract_source_X").is_some());
    assert!(store.get("contract_events_X").is_some());
    assert_eq!(store.stats().entries, 2);
}

#[tokio::test]
async fn flush_and_bulk_invalidation_report_outcomes() {
    let store = CacheStore::new();
    store.insert("a", json!(1), Duration::from_secs(60));
    store.insert("b", json!(2), Duration::from_secs(60));

    assert!(store.remove("a"));
    assert!(!store.remove("missing"));

    store.clear();
    assert_eq!(store.stats().entries, 0);
    assert!(!store.remove("b"));
}
