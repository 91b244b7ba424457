use serde_json::Value;
use thiserror::Error;

/// Errors raised while building wire values from application input.
///
/// Both variants indicate a caller/schema bug rather than a transient fault;
/// neither is ever retried.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Encode was asked to build a tag it doesn't implement.
    #[error("unsupported clarity type: {0}")]
    UnsupportedType(String),

    /// A value has a shape the codec cannot safely interpret for its tag.
    #[error("malformed {tag} value: {reason}")]
    Malformed { tag: String, reason: String },
}

impl CodecError {
    pub(crate) fn malformed(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed { tag: tag.into(), reason: reason.into() }
    }
}

/// A contract-level failure: the call response carried `success: false`.
///
/// This is not a transport fault. Callers decide whether the err payload is
/// user-visible ("ticket not found") or silent (treated as absent data).
#[derive(Debug, Clone, Error)]
#[error("contract returned err: {err}")]
pub struct ContractError {
    /// The raw err payload exactly as the contract produced it.
    pub err: Value,
}
