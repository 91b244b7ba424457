//! Cache administration endpoints.

pub mod cache;
pub mod types;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Routes under `/admin/cache`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/cache/stats", get(cache::get_stats))
        .route("/admin/cache/keys", get(cache::get_keys))
        .route("/admin/cache/flush", delete(cache::flush))
        .route("/admin/cache/key/{key}", delete(cache::evict_key))
        .route("/admin/cache/invalidate", post(cache::invalidate))
}
