use serde_json::Value;
use tracing::warn;

use super::{
    errors::ContractError,
    model::DecodedValue,
    wire::{tags, WireValue},
};

/// How err-shaped responses are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strictness {
    /// Err responses decode to `Optional(None)`; the raw err payload is
    /// logged, never raised.
    Permissive,
    /// Err responses raise [`ContractError`] carrying the err payload.
    Strict,
}

type TagPredicate = fn(&str) -> bool;
type TagHandler = fn(&WireValue, Strictness) -> Result<DecodedValue, ContractError>;

/// Ordered dispatch table, evaluated top to bottom.
///
/// Parameterized descriptors (`"(tuple ..."`, `"(string-ascii N)"`,
/// `"(string-utf8 N)"`) must be tried by prefix before the exact bare tags;
/// a bare-tag switch alone would miss them. Response-shaped values are
/// handled before this table is consulted at all.
const DISPATCH: &[(TagPredicate, TagHandler)] = &[
    (is_tuple, decode_tuple),
    (is_string_ascii, decode_text),
    (is_string_utf8, decode_text),
    (is_list, decode_list),
    (is_optional, decode_optional),
    (is_integer, decode_integer),
    (is_bool, decode_bool),
    (is_principal, decode_principal),
    (is_buffer, decode_buffer),
];

fn is_tuple(tag: &str) -> bool {
    tag.starts_with(tags::TUPLE_PREFIX) || tag == tags::TUPLE
}

fn is_string_ascii(tag: &str) -> bool {
    tag.starts_with(tags::STRING_ASCII_PREFIX) || tag == tags::STRING_ASCII
}

fn is_string_utf8(tag: &str) -> bool {
    tag.starts_with(tags::STRING_UTF8_PREFIX) || tag == tags::STRING_UTF8
}

fn is_list(tag: &str) -> bool {
    tag == tags::LIST
}

fn is_optional(tag: &str) -> bool {
    tag == tags::OPTIONAL
}

fn is_integer(tag: &str) -> bool {
    tag == tags::UINT || tag == tags::INT
}

fn is_bool(tag: &str) -> bool {
    tag == tags::BOOL
}

fn is_principal(tag: &str) -> bool {
    tag == tags::PRINCIPAL
}

fn is_buffer(tag: &str) -> bool {
    tag == tags::BUFFER
}

/// Decodes a wire value permissively.
///
/// Never fails: unknown tags pass their payload through untouched, malformed
/// shapes decode best-effort, and err-shaped responses decode to
/// `Optional(None)` with the raw err payload logged for telemetry.
#[must_use]
pub fn decode(value: &WireValue) -> DecodedValue {
    decode_value(value, Strictness::Permissive).unwrap_or_else(|err| {
        warn!(err = %err, "permissive decode surfaced a contract error; treating as absent");
        DecodedValue::none()
    })
}

/// Decodes a wire value, raising [`ContractError`] when the value (or any
/// nested response) indicates a contract-level failure.
///
/// # Errors
///
/// Returns the raw err payload when the response carries `success: false`.
pub fn decode_strict(value: &WireValue) -> Result<DecodedValue, ContractError> {
    decode_value(value, Strictness::Strict)
}

fn decode_value(value: &WireValue, mode: Strictness) -> Result<DecodedValue, ContractError> {
    if value.is_response_shaped() {
        return decode_response(value, mode);
    }
    for (matches, handler) in DISPATCH {
        if matches(&value.tag) {
            return handler(value, mode);
        }
    }
    // Unknown tag: defensive passthrough, never an error.
    Ok(DecodedValue::Raw(value.payload.clone()))
}

fn decode_response(value: &WireValue, mode: Strictness) -> Result<DecodedValue, ContractError> {
    // The `(response ...)` descriptor doesn't say which arm was taken; the
    // sibling success flag is the authoritative signal when present. Absent
    // flag on a response-tagged value is treated as ok.
    if value.success == Some(false) {
        return match mode {
            Strictness::Strict => Err(ContractError { err: value.payload.clone() }),
            Strictness::Permissive => {
                warn!(err = %value.payload, "contract call returned err");
                Ok(DecodedValue::none())
            }
        };
    }
    decode_payload(&value.payload, mode)
}

/// Decodes a raw payload that may be a nested tagged value, a bare map of
/// tuple fields (how ok-response payloads commonly arrive), or anything else.
fn decode_payload(payload: &Value, mode: Strictness) -> Result<DecodedValue, ContractError> {
    match payload {
        Value::Object(map) if map.get("tag").is_some_and(Value::is_string) => {
            match serde_json::from_value::<WireValue>(payload.clone()) {
                Ok(inner) => decode_value(&inner, mode),
                Err(_) => Ok(DecodedValue::Raw(payload.clone())),
            }
        }
        Value::Object(map) => Ok(DecodedValue::Tuple(decode_fields(map, mode)?)),
        other => Ok(DecodedValue::Raw(other.clone())),
    }
}

fn decode_fields(
    map: &serde_json::Map<String, Value>,
    mode: Strictness,
) -> Result<Vec<(String, DecodedValue)>, ContractError> {
    let mut fields = Vec::with_capacity(map.len());
    for (name, raw) in map {
        fields.push((name.clone(), decode_payload(raw, mode)?));
    }
    Ok(fields)
}

fn decode_tuple(value: &WireValue, mode: Strictness) -> Result<DecodedValue, ContractError> {
    match &value.payload {
        Value::Object(map) => Ok(DecodedValue::Tuple(decode_fields(map, mode)?)),
        // Missing or empty payload yields an empty mapping, never an error.
        Value::Null => Ok(DecodedValue::Tuple(Vec::new())),
        other => {
            warn!(tag = %value.tag, payload = %other, "tuple payload is not an object");
            Ok(DecodedValue::Tuple(Vec::new()))
        }
    }
}

fn decode_list(value: &WireValue, mode: Strictness) -> Result<DecodedValue, ContractError> {
    match &value.payload {
        Value::Array(items) => {
            let mut decoded = Vec::with_capacity(items.len());
            for item in items {
                decoded.push(decode_payload(item, mode)?);
            }
            Ok(DecodedValue::List(decoded))
        }
        Value::Null => Ok(DecodedValue::List(Vec::new())),
        other => {
            warn!(payload = %other, "list payload is not an array");
            Ok(DecodedValue::List(Vec::new()))
        }
    }
}

fn decode_optional(value: &WireValue, mode: Strictness) -> Result<DecodedValue, ContractError> {
    if is_none_sentinel(&value.payload) {
        return Ok(DecodedValue::none());
    }
    Ok(DecodedValue::some(decode_payload(&value.payload, mode)?))
}

/// Absent and falsy payloads all mean "none"; permissive producers emit any
/// of these for an empty optional.
fn is_none_sentinel(payload: &Value) -> bool {
    match payload {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_i64() == Some(0),
        _ => false,
    }
}

fn decode_integer(value: &WireValue, _mode: Strictness) -> Result<DecodedValue, ContractError> {
    let parsed = match &value.payload {
        Value::String(s) => parse_decimal(s.trim(), &value.tag),
        Value::Number(n) => {
            // Numeric input is accepted for permissive call sites; values
            // that overflow i64/u64 arrive as decimal strings instead.
            if value.tag == tags::UINT {
                n.as_u64().map(|v| v.to_string())
            } else {
                n.as_i64().map(|v| v.to_string())
            }
        }
        _ => None,
    };
    match parsed {
        Some(decimal) => Ok(DecodedValue::Integer(decimal)),
        None => {
            warn!(tag = %value.tag, payload = %value.payload, "integer payload did not parse");
            Ok(DecodedValue::Raw(value.payload.clone()))
        }
    }
}

/// Validates a decimal string against Clarity's native integer width
/// (unsigned or signed 128-bit) and normalizes it (strips leading zeros,
/// canonical sign).
fn parse_decimal(s: &str, tag: &str) -> Option<String> {
    if tag == tags::UINT {
        s.parse::<u128>().ok().map(|v| v.to_string())
    } else {
        s.parse::<i128>().ok().map(|v| v.to_string())
    }
}

fn decode_bool(value: &WireValue, _mode: Strictness) -> Result<DecodedValue, ContractError> {
    match &value.payload {
        Value::Bool(b) => Ok(DecodedValue::Bool(*b)),
        // Some producers stringify booleans.
        Value::String(s) if s == "true" => Ok(DecodedValue::Bool(true)),
        Value::String(s) if s == "false" => Ok(DecodedValue::Bool(false)),
        other => {
            warn!(payload = %other, "bool payload is neither boolean nor \"true\"/\"false\"");
            Ok(DecodedValue::Raw(other.clone()))
        }
    }
}

fn decode_text(value: &WireValue, _mode: Strictness) -> Result<DecodedValue, ContractError> {
    expect_string(value, DecodedValue::Text)
}

fn decode_principal(value: &WireValue, _mode: Strictness) -> Result<DecodedValue, ContractError> {
    expect_string(value, DecodedValue::Principal)
}

fn decode_buffer(value: &WireValue, _mode: Strictness) -> Result<DecodedValue, ContractError> {
    expect_string(value, DecodedValue::Bytes)
}

fn expect_string(
    value: &WireValue,
    variant: fn(String) -> DecodedValue,
) -> Result<DecodedValue, ContractError> {
    match &value.payload {
        Value::String(s) => Ok(variant(s.clone())),
        other => {
            warn!(tag = %value.tag, payload = %other, "expected string payload");
            Ok(DecodedValue::Raw(other.clone()))
        }
    }
}
