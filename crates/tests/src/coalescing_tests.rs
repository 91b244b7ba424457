//! Concurrent-caller coalescing guarantees of the fetch façade.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use serde_json::json;
use strata_core::{
    cache::{CachedFetcher, CacheStore},
    upstream::UpstreamError,
    Error,
};

fn fetcher() -> Arc<CachedFetcher> {
    Arc::new(CachedFetcher::new(Arc::new(CacheStore::new())))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ten_concurrent_callers_trigger_exactly_one_fetch() {
    let fetcher = fetcher();
    let counter = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let fetcher = Arc::clone(&fetcher);
        let counter = Arc::clone(&counter);
        handles.push(tokio::spawn(async move {
            fetcher
                .fetch_cached("X", Duration::from_secs(60), move || async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(json!(counter.fetch_add(1, Ordering::SeqCst) + 1))
                })
                .await
        }));
    }

    for handle in handles {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(value, json!(1), "every caller must see the single fetch's result");
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn coalesced_failure_reaches_every_waiter_and_is_not_cached() {
    let fetcher = fetcher();
    let counter = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let fetcher = Arc::clone(&fetcher);
        let counter = Arc::clone(&counter);
        handles.push(tokio::spawn(async move {
            fetcher
                .fetch_cached("X", Duration::from_secs(60), move || async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::Upstream(UpstreamError::Unavailable {
                        attempts: 3,
                        last_error: "503".to_string(),
                    }))
                })
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_err());
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1, "failure must be shared, not repeated");
    assert_eq!(fetcher.store().get("X"), None, "failures are never cached");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn coalescing_is_per_key_not_global() {
    let fetcher = fetcher();
    let counter = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for key in ["a", "b", "c"] {
        for _ in 0..3 {
            let fetcher = Arc::clone(&fetcher);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                fetcher
                    .fetch_cached(key, Duration::from_secs(60), move || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(json!(key))
                    })
                    .await
            }));
        }
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(counter.load(Ordering::SeqCst), 3, "one fetch per key");
}

#[tokio::test]
async fn callers_after_completion_hit_the_cache() {
    let fetcher = fetcher();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let counter = Arc::clone(&counter);
        let value = fetcher
            .fetch_cached("X", Duration::from_secs(60), move || async move {
                Ok(json!(counter.fetch_add(1, Ordering::SeqCst) + 1))
            })
            .await
            .unwrap();
        assert_eq!(value, json!(1));
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.inflight_len(), 0);
}
