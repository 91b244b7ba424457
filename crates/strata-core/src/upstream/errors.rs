use thiserror::Error;

/// Errors that can occur when talking to the upstream indexing API.
///
/// Client-side timeouts are classified as network errors during retries, so
/// an exhausted timeout surfaces as [`UpstreamError::Unavailable`] like any
/// other transport failure.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum UpstreamError {
    /// Transport-level failure outside the retry loop (client construction,
    /// invalid configuration).
    #[error("network error: {0}")]
    Network(String),

    /// Non-retryable HTTP status (4xx other than 429): a caller/input
    /// error, failed immediately without retrying.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Retries exhausted against 429. Carries the upstream's advisory
    /// `Retry-After` value so the HTTP-facing layer can surface its own
    /// 429 + `Retry-After` to end users.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// Retries exhausted against 5xx/network failures (timeouts included).
    #[error("upstream unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    /// A 2xx response whose body could not be parsed as JSON.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    /// The detached fetch task died before producing a result.
    #[error("fetch task failed: {0}")]
    TaskFailed(String),
}

impl UpstreamError {
    /// True when the same logical call could succeed if repeated later.
    ///
    /// The request executor has already retried within its own budget by the
    /// time one of these surfaces; transience here informs the caller's
    /// choice of response (e.g. 503 vs 400), not another retry loop.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) |
            Self::RateLimitExceeded { .. } |
            Self::Unavailable { .. } |
            Self::TaskFailed(_) => true,
            Self::Status { status, .. } => (500..=599).contains(status) || *status == 429,
            Self::InvalidResponse(_) => false,
        }
    }

    /// True when retrying can't help: the request itself is wrong.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::InvalidResponse(_) => true,
            Self::Status { status, .. } => (400..=499).contains(status) && *status != 429,
            _ => false,
        }
    }
}
