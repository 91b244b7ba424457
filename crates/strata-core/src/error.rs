use thiserror::Error;

use crate::{
    upstream::UpstreamError,
    values::{CodecError, ContractError},
};

/// Crate-level error composing the three failure families.
///
/// The coalescing façade hands this out `Arc`-wrapped so every waiter on a
/// shared in-flight fetch observes the same failure. Layers above the
/// request executor treat any of these as final for the call; the executor
/// is the only layer that retries.
#[derive(Debug, Error)]
pub enum Error {
    /// Encode/decode failure; permanent, surfaced as a 4xx-equivalent.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The contract itself reported failure (`success: false`).
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Transport-level failure from the upstream API, retries already
    /// applied where the policy allowed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl Error {
    /// True when retrying the whole logical call later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Codec(_) | Error::Contract(_) => false,
            Error::Upstream(e) => e.is_transient(),
        }
    }
}
