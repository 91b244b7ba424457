//! Data routes: thin adapters over the core.
//!
//! Each handler builds a deterministic cache key (method + path + every
//! parameter that affects the response), picks the endpoint's TTL class, and
//! hands a `work()` closure to the coalescing façade. Contract-call results
//! pass through the value codec before being cached.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use strata_core::{
    contract::{self, ReadOnlyCall},
    upstream::{CallClass, UpstreamError},
    Error,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/contracts/{id}", get(get_contract))
        .route("/v1/contracts/{id}/transactions", get(get_contract_transactions))
        .route("/v1/contracts/call-read", post(call_read))
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    20
}

/// GET /v1/contracts/{id}
///
/// Contract metadata and source, cached under the `contract_info` TTL class.
async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let key = format!("contract_{id}");
    let ttl = state.config.ttl_for("contract_info");
    let client = Arc::clone(&state.client);
    let value = state
        .fetcher
        .fetch_cached(&key, ttl, move || async move {
            client
                .get_json(&format!("/extended/v1/contract/{id}"), CallClass::Entity)
                .await
                .map_err(Error::from)
        })
        .await
        .map_err(ApiError)?;
    Ok(Json(value))
}

/// GET /v1/contracts/{id}/transactions?limit=&offset=
///
/// Paginated transaction list; limit and offset are part of the cache key
/// because they change the response.
async fn get_contract_transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let key = format!("contract_{id}_transactions_{}_{}", page.limit, page.offset);
    let ttl = state.config.ttl_for("contract_transactions");
    let client = Arc::clone(&state.client);
    let value = state
        .fetcher
        .fetch_cached(&key, ttl, move || async move {
            client
                .get_json(
                    &format!(
                        "/extended/v1/contract/{id}/transactions?limit={}&offset={}",
                        page.limit, page.offset
                    ),
                    CallClass::List,
                )
                .await
                .map_err(Error::from)
        })
        .await
        .map_err(ApiError)?;
    Ok(Json(value))
}

/// POST /v1/contracts/call-read
///
/// Read-only contract call: arguments are encoded to wire values, the
/// decoded result is cached and returned as plain JSON.
async fn call_read(
    State(state): State<AppState>,
    Json(call): Json<ReadOnlyCall>,
) -> Result<Json<Value>, ApiError> {
    let key = call_cache_key(&call);
    let ttl = state.config.ttl_for("contract_call");
    let client = Arc::clone(&state.client);
    let value = state
        .fetcher
        .fetch_cached(&key, ttl, move || async move {
            let decoded = contract::call_read_only(&client, &call).await?;
            Ok(decoded.to_json())
        })
        .await
        .map_err(ApiError)?;
    Ok(Json(value))
}

/// Deterministic key for a read-only call: everything that affects the
/// result participates.
fn call_cache_key(call: &ReadOnlyCall) -> String {
    let args = serde_json::to_string(&call.arguments).unwrap_or_default();
    format!("call_{}_{}_{}_{args}", call.contract_id, call.function, call.sender)
}

/// Maps core errors onto the HTTP surface.
///
/// Rate-limit exhaustion becomes this service's own 429 with the advisory
/// `Retry-After` passed along; upstream unavailability becomes 503; caller
/// errors stay 4xx.
pub struct ApiError(Arc<Error>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.as_ref() {
            Error::Codec(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Error::Contract(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Error::Upstream(e) => match e {
                UpstreamError::RateLimitExceeded { retry_after_secs } => {
                    return (
                        StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, retry_after_secs.to_string())],
                        Json(json!({ "error": e.to_string() })),
                    )
                        .into_response();
                }
                UpstreamError::Status { status, .. } => (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    e.to_string(),
                ),
                UpstreamError::Unavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
                }
                UpstreamError::Network(_) |
                UpstreamError::InvalidResponse(_) |
                UpstreamError::TaskFailed(_) => (StatusCode::BAD_GATEWAY, e.to_string()),
                _ => (StatusCode::BAD_GATEWAY, e.to_string()),
            },
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
