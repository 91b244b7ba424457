//! # Strata Core
//!
//! Core library for the Strata Clarity-chain data-access layer.
//!
//! This crate provides the foundational components for reading and writing
//! values on a Clarity-based smart-contract chain through a conventional
//! JSON/HTTP surface, without exposing callers to the chain's tagged value
//! wire format or to the rate limits of the upstream indexing API:
//!
//! - **[`values`]**: Bidirectional, recursive codec between the chain's
//!   tagged-union wire representation ([`values::WireValue`]) and a JSON-safe
//!   application-native representation ([`values::DecodedValue`]).
//!
//! - **[`cache`]**: In-memory TTL cache store with lazy expiry and a
//!   coalescing fetch façade that guarantees at most one in-flight fetch per
//!   logical key.
//!
//! - **[`upstream`]**: Resilient HTTP client for the upstream indexing API
//!   with retry classification (rate-limit aware, exponential backoff for
//!   transient failures, fail-fast for permanent ones).
//!
//! - **[`contract`]**: Read-only contract-call adapter that routes arguments
//!   and results through the codec.
//!
//! - **[`config`]**: Layered configuration (compiled defaults, TOML file,
//!   `STRATA__*` environment overrides).
//!
//! ## Request Flow
//!
//! ```text
//! Caller (route / service adapter)
//!       │  key, ttl, work()
//!       ▼
//! ┌───────────────┐
//! │ CachedFetcher │ ─── Hit ──► Cached Response
//! └───────┬───────┘
//!         │ Miss
//!         ▼
//! ┌───────────────┐
//! │ In-flight map │ ─── Pending ──► Await shared result
//! └───────┬───────┘
//!         │ First caller
//!         ▼
//! ┌───────────────┐     ┌──────────────┐
//! │   ApiClient   │ ──► │ RetryPolicy  │ 429 / 5xx / network
//! │ (upstream API)│ ◄── │ (backoff)    │
//! └───────┬───────┘     └──────────────┘
//!         │ 2xx JSON (contract results pass through values::decode)
//!         ▼
//! ┌───────────────┐
//! │  CacheStore   │  insert(key, value, ttl) on success only
//! └───────┬───────┘
//!         ▼
//!   Response to all coalesced callers
//! ```

pub mod cache;
pub mod config;
pub mod contract;
pub mod error;
pub mod upstream;
pub mod values;

pub use error::Error;
