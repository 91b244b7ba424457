use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use super::store::CacheStore;
use crate::{error::Error, upstream::UpstreamError};

type FetchResult = Result<Value, Arc<Error>>;
type InflightFuture = Shared<BoxFuture<'static, FetchResult>>;

/// The coalescing façade in front of the cache store.
///
/// For a given key, at most one `work()` is in flight at any instant:
/// concurrent callers for the same key all await one shared result instead
/// of issuing independent upstream calls. Failures propagate to every
/// coalesced waiter (`Arc`-wrapped) and are never cached.
///
/// The store and the in-flight map are mutated only here; adapters never
/// touch them directly.
pub struct CachedFetcher {
    store: Arc<CacheStore>,
    inflight: Mutex<HashMap<String, InflightFuture>>,
}

impl CachedFetcher {
    #[must_use]
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store, inflight: Mutex::new(HashMap::new()) }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Returns the cached value for `key`, or runs `work()` (once, however
    /// many callers arrive concurrently) and caches its result for `ttl`.
    ///
    /// `work()` runs on a detached task: a caller abandoning its await
    /// (its own timeout, say) does not cancel the fetch, which completes
    /// and still populates the cache for subsequent callers.
    ///
    /// # Errors
    ///
    /// Propagates the `work()` failure to every coalesced waiter. Nothing
    /// is cached on failure.
    pub async fn fetch_cached<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        work: F,
    ) -> FetchResult
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, Error>> + Send + 'static,
    {
        if let Some(value) = self.store.get(key) {
            return Ok(value);
        }

        let shared = self.join_or_spawn(key, ttl, work);
        let result = shared.clone().await;
        self.clear_settled(key, &shared);
        result
    }

    /// Joins the in-flight fetch for `key` if one exists, otherwise
    /// registers a new one.
    fn join_or_spawn<F, Fut>(&self, key: &str, ttl: Duration, work: F) -> InflightFuture
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, Error>> + Send + 'static,
    {
        let mut inflight = self.inflight.lock();
        if let Some(existing) = inflight.get(key) {
            debug!(key, "joining in-flight fetch");
            return existing.clone();
        }

        let store = Arc::clone(&self.store);
        let key_owned = key.to_string();
        let handle = tokio::spawn(async move {
            match work().await {
                Ok(value) => {
                    store.insert(&key_owned, value.clone(), ttl);
                    Ok(value)
                }
                Err(e) => Err(Arc::new(e)),
            }
        });

        let shared: InflightFuture = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    Err(Arc::new(Error::Upstream(UpstreamError::TaskFailed(e.to_string()))))
                }
            }
        }
        .boxed()
        .shared();

        inflight.insert(key.to_string(), shared.clone());
        shared
    }

    /// Removes the in-flight slot once its fetch has settled, so the next
    /// caller goes back through the store. Guarded by pointer identity: a
    /// newer fetch registered under the same key is left alone.
    fn clear_settled(&self, key: &str, settled: &InflightFuture) {
        let mut inflight = self.inflight.lock();
        if inflight.get(key).is_some_and(|current| current.ptr_eq(settled)) {
            inflight.remove(key);
        }
    }

    /// Number of keys with a fetch currently in flight.
    #[must_use]
    pub fn inflight_len(&self) -> usize {
        self.inflight.lock().len()
    }
}
