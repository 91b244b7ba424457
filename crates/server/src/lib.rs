//! HTTP service for the Strata data-access core.
//!
//! Hosts two surfaces over one shared [`state::AppState`]:
//!
//! - [`admin`]: cache administration (stats, keys, flush, per-key and bulk
//!   eviction).
//! - [`data`]: thin adapters over the core; each builds a cache key and a
//!   `work()` closure and goes through the coalescing façade; contract-call
//!   results pass through the value codec.

pub mod admin;
pub mod data;
pub mod state;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Builds the full application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(admin::routes())
        .merge(data::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
