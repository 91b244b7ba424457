use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use ahash::RandomState;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::{sync::broadcast, task::JoinHandle, time::Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Counters and sizing exposed on the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Key → (value, expiry) map with per-key TTL.
///
/// Expiry is checked lazily at read time; an entry past its deadline is
/// treated as absent and evicted on the spot. Writing a key overwrites any
/// previous entry wholesale and resets its TTL. A periodic sweep
/// ([`CacheStore::spawn_sweeper`]) bounds memory held by keys nobody reads
/// again; it is not required for correctness.
pub struct CacheStore {
    entries: DashMap<String, CacheEntry, RandomState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached value, or `None` when the key is missing or its
    /// entry has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let live = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => None,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };
        match live {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                // The shard guard from the lookup is gone by now; safe to
                // evict the expired entry.
                self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Overwrites `key` unconditionally and resets its TTL.
    pub fn insert(&self, key: &str, value: Value, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at: Instant::now() + ttl });
    }

    /// Evicts one key; returns whether an entry was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Clears every entry. Counters are preserved.
    pub fn clear(&self) {
        self.entries.clear();
        info!("cache flushed");
    }

    /// Drops expired entries eagerly; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Spawns the periodic expiry sweep, stopped by the shutdown broadcast.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = store.purge_expired();
                        if purged > 0 {
                            debug!(purged, "swept expired cache entries");
                        }
                    }
                    _ = shutdown.recv() => {
                        debug!("cache sweeper shutting down");
                        return;
                    }
                }
            }
        })
    }
}
