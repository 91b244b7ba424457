use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known bare tags of the wire format.
///
/// Parameterized forms wrap these in a parenthesized descriptor carrying
/// size/type parameters, e.g. `"(string-ascii 46)"` or
/// `"(response (tuple ...) uint)"`; dispatch on those is by prefix.
pub mod tags {
    pub const UINT: &str = "uint";
    pub const INT: &str = "int";
    pub const BOOL: &str = "bool";
    pub const STRING_ASCII: &str = "string-ascii";
    pub const STRING_UTF8: &str = "string-utf8";
    pub const PRINCIPAL: &str = "principal";
    pub const TUPLE: &str = "tuple";
    pub const LIST: &str = "list";
    pub const OPTIONAL: &str = "optional";
    pub const BUFFER: &str = "buffer";
    pub const RESPONSE: &str = "response";

    pub const TUPLE_PREFIX: &str = "(tuple";
    pub const STRING_ASCII_PREFIX: &str = "(string-ascii";
    pub const STRING_UTF8_PREFIX: &str = "(string-utf8";
    pub const RESPONSE_PREFIX: &str = "(response";
}

/// A self-describing chain value as it crosses the contract-call boundary.
///
/// The `payload` shape depends on `tag`: a decimal-string integer, a boolean,
/// a string, a field-name → `WireValue` object (tuple), an ordered array
/// (list), a nested value or null (optional), or a hex string (buffer).
///
/// `success` is a sibling signal that only carries meaning for
/// response-shaped values; some producers set it instead of (or alongside) a
/// `(response ...)` tag, so decoding checks both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireValue {
    /// May be absent on the wire when a producer only sets `success`; an
    /// empty tag matches nothing in the dispatch table, so such values are
    /// handled entirely by the response path.
    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub payload: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl WireValue {
    pub fn new(tag: impl Into<String>, payload: Value) -> Self {
        Self { tag: tag.into(), payload, success: None }
    }

    /// True when this value should be decoded as a contract-call response:
    /// either the tag carries the `(response ...)` descriptor or the sibling
    /// `success` field is populated.
    #[must_use]
    pub fn is_response_shaped(&self) -> bool {
        self.success.is_some() || self.tag.starts_with(tags::RESPONSE_PREFIX) ||
            self.tag == tags::RESPONSE
    }
}
