//! Application configuration with layered loading.
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `STRATA_CONFIG` env var
//! 3. **Environment variables**: `STRATA__*` env vars override specific
//!    fields, with `__` as the nesting separator
//!    (e.g. `STRATA__SERVER__BIND_PORT=8080`)
//!
//! # Example
//!
//! ```toml
//! [upstream]
//! base_url = "https://api.testnet.hiro.so"
//! max_retries = 2
//!
//! [cache]
//! default_ttl_seconds = 300
//!
//! [cache.ttl_overrides]
//! contract_source = 3600
//! contract_events = 30
//! ```

use std::{collections::HashMap, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{contract::BatchMode, upstream::ApiClientConfig};

/// Upstream indexing API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamApiConfig {
    /// Base URL of the upstream indexing API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional API key sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Header name carrying the API key. Defaults to `x-api-key`.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Retry budget per logical call (attempts = retries + 1). Defaults to `2`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Client-side timeout for single-entity reads. Defaults to `10`.
    #[serde(default = "default_entity_timeout_seconds")]
    pub entity_timeout_seconds: u64,

    /// Client-side timeout for paginated list reads. Defaults to `15`.
    #[serde(default = "default_list_timeout_seconds")]
    pub list_timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.hiro.so".to_string()
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_entity_timeout_seconds() -> u64 {
    10
}

fn default_list_timeout_seconds() -> u64 {
    15
}

/// Cache TTL settings.
///
/// TTL is chosen per endpoint, not globally: fast-changing data (live event
/// logs) wants a shorter TTL than slow-changing data (compiled contract
/// source). `ttl_overrides` maps an endpoint class name to its TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Fallback TTL in seconds for endpoints without an override. Defaults
    /// to `300`.
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,

    /// Per-endpoint TTL overrides, keyed by endpoint class.
    #[serde(default)]
    pub ttl_overrides: HashMap<String, u64>,

    /// Interval of the background expiry sweep. Defaults to `60`.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    300
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Defaults to `3030`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3030
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g. "trace", "debug", "info", "warn", "error"). Defaults
    /// to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Batched contract-call dispatch settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Sequential (default, queue order preserved) or parallel draining.
    #[serde(default)]
    pub mode: BatchMode,
}

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamApiConfig,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl Default for UpstreamApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_header: default_api_key_header(),
            max_retries: default_max_retries(),
            entity_timeout_seconds: default_entity_timeout_seconds(),
            list_timeout_seconds: default_list_timeout_seconds(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_ttl_seconds(),
            ttl_overrides: HashMap::new(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: default_bind_address(), bind_port: default_bind_port() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// deserialized.
    pub fn from_file(config_path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("STRATA").separator("__"));
        builder.build()?.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` (overridable via the
    /// `STRATA_CONFIG` env var) with fallback to compiled defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("STRATA_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// TTL for an endpoint class, honoring per-endpoint overrides.
    #[must_use]
    pub fn ttl_for(&self, endpoint_class: &str) -> Duration {
        let seconds = self
            .cache
            .ttl_overrides
            .get(endpoint_class)
            .copied()
            .unwrap_or(self.cache.default_ttl_seconds);
        Duration::from_secs(seconds)
    }

    /// Bridges the configuration into the upstream client's own config.
    #[must_use]
    pub fn api_client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            base_url: self.upstream.base_url.clone(),
            api_key: self.upstream.api_key.clone(),
            api_key_header: self.upstream.api_key_header.clone(),
            max_retries: self.upstream.max_retries,
            entity_timeout: Duration::from_secs(self.upstream.entity_timeout_seconds),
            list_timeout: Duration::from_secs(self.upstream.list_timeout_seconds),
        }
    }

    /// Parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string when the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port).parse().map_err(|_| {
            format!("invalid socket address: {}:{}", self.server.bind_address, self.server.bind_port)
        })
    }
}
