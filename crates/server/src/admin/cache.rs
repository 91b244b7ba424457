//! Cache endpoint handlers.

#![allow(clippy::cast_precision_loss)]

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    admin::types::{
        CacheKeysResponse, CacheStatsResponse, EvictionResponse, InvalidateRequest,
        InvalidateResponse, SuccessResponse,
    },
    state::AppState,
};

/// Calculates hit rate as a percentage from hits and misses.
///
/// Returns 0.0 if total (hits + misses) is zero to avoid division by zero.
fn calculate_hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total > 0 {
        (hits as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// GET /admin/cache/stats
///
/// Returns current cache statistics.
#[utoipa::path(
    get,
    path = "/admin/cache/stats",
    tag = "Cache",
    responses(
        (status = 200, description = "Current cache statistics", body = CacheStatsResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.fetcher.store().stats();
    Json(CacheStatsResponse {
        entries: stats.entries,
        hits: stats.hits,
        misses: stats.misses,
        hit_rate: calculate_hit_rate(stats.hits, stats.misses),
    })
}

/// GET /admin/cache/keys
///
/// Lists the keys currently held in the cache.
#[utoipa::path(
    get,
    path = "/admin/cache/keys",
    tag = "Cache",
    responses(
        (status = 200, description = "Current cache keys", body = CacheKeysResponse)
    )
)]
pub async fn get_keys(State(state): State<AppState>) -> impl IntoResponse {
    let mut keys = state.fetcher.store().keys();
    keys.sort_unstable();
    Json(CacheKeysResponse { keys })
}

/// DELETE /admin/cache/flush
///
/// Clears every cache entry.
#[utoipa::path(
    delete,
    path = "/admin/cache/flush",
    tag = "Cache",
    responses(
        (status = 200, description = "Cache cleared", body = SuccessResponse)
    )
)]
pub async fn flush(State(state): State<AppState>) -> impl IntoResponse {
    state.fetcher.store().clear();
    info!("cache flushed via admin api");
    Json(SuccessResponse { success: true })
}

/// DELETE /admin/cache/key/{key}
///
/// Evicts a single entry.
#[utoipa::path(
    delete,
    path = "/admin/cache/key/{key}",
    tag = "Cache",
    params(
        ("key" = String, Path, description = "Cache key to evict")
    ),
    responses(
        (status = 200, description = "Eviction outcome", body = EvictionResponse)
    )
)]
pub async fn evict_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let deleted = state.fetcher.store().remove(&key);
    if deleted {
        info!(key = %key, "cache key evicted via admin api");
    }
    Json(EvictionResponse { key, deleted })
}

/// POST /admin/cache/invalidate
///
/// Bulk-evicts the given keys, reporting the outcome per key.
#[utoipa::path(
    post,
    path = "/admin/cache/invalidate",
    tag = "Cache",
    request_body = InvalidateRequest,
    responses(
        (status = 200, description = "Per-key eviction outcomes", body = InvalidateResponse)
    )
)]
pub async fn invalidate(
    State(state): State<AppState>,
    Json(request): Json<InvalidateRequest>,
) -> impl IntoResponse {
    let store = state.fetcher.store();
    let results = request
        .keys
        .into_iter()
        .map(|key| {
            let deleted = store.remove(&key);
            EvictionResponse { key, deleted }
        })
        .collect::<Vec<_>>();
    info!(evicted = results.iter().filter(|r| r.deleted).count(), "bulk cache invalidation");
    Json(InvalidateResponse { results })
}
