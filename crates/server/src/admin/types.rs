use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cache counters as exposed on the admin surface.
#[derive(Debug, Serialize, ToSchema)]
pub struct CacheStatsResponse {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Percentage of reads served from the cache.
    pub hit_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CacheKeysResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EvictionResponse {
    pub key: String,
    pub deleted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvalidateRequest {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvalidateResponse {
    pub results: Vec<EvictionResponse>,
}
