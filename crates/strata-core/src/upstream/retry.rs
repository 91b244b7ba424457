use std::time::Duration;

/// What a single HTTP attempt produced, as far as retry classification is
/// concerned. Successful (2xx) responses are never classified; the
/// executor returns them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A response arrived with a non-2xx status. `retry_after` carries the
    /// parsed `Retry-After` header (seconds) when the upstream sent one.
    Status { status: u16, retry_after: Option<u64> },
    /// No response at all (connection refused, reset, DNS failure).
    Network,
    /// The client-side timeout elapsed. Counts as a network error for
    /// classification.
    Timeout,
}

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep exactly this long (upstream-advised), then retry.
    RetryAfter(Duration),
    /// Sleep the computed exponential backoff, then retry.
    Backoff(Duration),
    /// Permanent failure or retry budget exhausted; give up.
    Fail,
}

/// Pure retry classifier; owns no I/O and no mutable state.
///
/// `attempt` starts at 0, so `max_retries = 2` allows up to 3 total
/// attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// First backoff step; doubles per attempt.
    pub backoff_base: Duration,
    /// Hard cap on a single backoff sleep.
    pub backoff_cap: Duration,
    /// Used when a 429 arrives without a parseable `Retry-After` header.
    pub default_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(1000),
            backoff_cap: Duration::from_millis(5000),
            default_retry_after: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self { max_retries, ..Self::default() }
    }

    /// Classifies one failed attempt.
    ///
    /// - 429: honor `Retry-After` (default when absent/unparseable) while
    ///   budget remains.
    /// - 5xx, network errors, timeouts: exponential backoff while budget
    ///   remains.
    /// - Any other 4xx: fail immediately, the request itself is wrong.
    #[must_use]
    pub fn classify(&self, attempt: u32, outcome: &AttemptOutcome) -> RetryDecision {
        match outcome {
            AttemptOutcome::Status { status: 429, retry_after } => {
                if attempt < self.max_retries {
                    let delay = retry_after
                        .map_or(self.default_retry_after, Duration::from_secs);
                    RetryDecision::RetryAfter(delay)
                } else {
                    RetryDecision::Fail
                }
            }
            AttemptOutcome::Status { status, .. } if (500..=599).contains(status) => {
                self.backoff_or_fail(attempt)
            }
            AttemptOutcome::Network | AttemptOutcome::Timeout => self.backoff_or_fail(attempt),
            AttemptOutcome::Status { .. } => RetryDecision::Fail,
        }
    }

    fn backoff_or_fail(&self, attempt: u32) -> RetryDecision {
        if attempt < self.max_retries {
            RetryDecision::Backoff(self.backoff_delay(attempt))
        } else {
            RetryDecision::Fail
        }
    }

    /// `min(backoff_base * 2^attempt, backoff_cap)`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base.saturating_mul(factor).min(self.backoff_cap)
    }
}
