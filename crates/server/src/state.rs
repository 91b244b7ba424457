use std::sync::Arc;

use strata_core::{cache::CachedFetcher, config::AppConfig, upstream::ApiClient};

/// Shared service state: one cache/fetcher/client per process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fetcher: Arc<CachedFetcher>,
    pub client: Arc<ApiClient>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, fetcher: Arc<CachedFetcher>, client: Arc<ApiClient>) -> Self {
        Self { config, fetcher, client }
    }
}
