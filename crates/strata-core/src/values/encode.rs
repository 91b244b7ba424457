use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{
    errors::CodecError,
    wire::{tags, WireValue},
};

/// A JSON argument descriptor: the value to encode plus the explicit type
/// tag that disambiguates it (JSON alone cannot tell `uint` from `int` from
/// `string-ascii`).
#[derive(Debug, Clone, Deserialize)]
pub struct EncodeRequest {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub value: Value,
}

impl EncodeRequest {
    pub fn new(type_tag: impl Into<String>, value: Value) -> Self {
        Self { type_tag: type_tag.into(), value }
    }
}

/// Builds a wire value from a JSON argument descriptor.
///
/// # Errors
///
/// [`CodecError::UnsupportedType`] for a type tag the codec doesn't
/// implement, [`CodecError::Malformed`] when the value doesn't fit the tag.
/// Both are permanent caller errors and are never retried.
pub fn encode(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    let tag = request.type_tag.as_str();

    if tag == tags::UINT || tag == tags::INT {
        return encode_integer(request);
    }
    if tag == tags::BOOL {
        return encode_bool(request);
    }
    if tag == tags::STRING_ASCII ||
        tag == tags::STRING_UTF8 ||
        tag.starts_with(tags::STRING_ASCII_PREFIX) ||
        tag.starts_with(tags::STRING_UTF8_PREFIX)
    {
        return encode_text(request);
    }
    if tag == tags::PRINCIPAL {
        return encode_principal(request);
    }
    if tag == tags::TUPLE || tag.starts_with(tags::TUPLE_PREFIX) {
        return encode_tuple(request);
    }
    if tag == tags::LIST {
        return encode_list(request);
    }
    if tag == tags::OPTIONAL {
        return encode_optional(request);
    }
    if tag == tags::BUFFER {
        return encode_buffer(request);
    }

    Err(CodecError::UnsupportedType(request.type_tag.clone()))
}

/// Maps [`encode`] over a JSON array of argument descriptors.
///
/// Elements that fail to encode are dropped and logged so one malformed
/// argument doesn't abort an otherwise-valid batch; callers that need
/// all-or-nothing semantics compare the returned count against the input
/// count.
#[must_use]
pub fn encode_all(args: &[Value]) -> Vec<WireValue> {
    let mut encoded = Vec::with_capacity(args.len());
    for (index, raw) in args.iter().enumerate() {
        let request = match serde_json::from_value::<EncodeRequest>(raw.clone()) {
            Ok(req) => req,
            Err(e) => {
                warn!(index, error = %e, "argument is not a type/value descriptor; dropping");
                continue;
            }
        };
        match encode(&request) {
            Ok(value) => encoded.push(value),
            Err(e) => {
                warn!(index, error = %e, "argument failed to encode; dropping");
            }
        }
    }
    encoded
}

fn encode_integer(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    let decimal = match &request.value {
        Value::String(s) => validate_decimal(s.trim(), &request.type_tag),
        Value::Number(n) => {
            if request.type_tag == tags::UINT {
                n.as_u64().map(|v| v.to_string())
            } else {
                n.as_i64().map(|v| v.to_string())
            }
        }
        _ => None,
    };
    decimal
        .map(|d| WireValue::new(request.type_tag.clone(), Value::String(d)))
        .ok_or_else(|| {
            CodecError::malformed(&request.type_tag, format!("not an integer: {}", request.value))
        })
}

fn validate_decimal(s: &str, tag: &str) -> Option<String> {
    if tag == tags::UINT {
        s.parse::<u128>().ok().map(|v| v.to_string())
    } else {
        s.parse::<i128>().ok().map(|v| v.to_string())
    }
}

fn encode_bool(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    let flag = match &request.value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    };
    flag.map(|b| WireValue::new(tags::BOOL, Value::Bool(b))).ok_or_else(|| {
        CodecError::malformed(tags::BOOL, format!("not a boolean: {}", request.value))
    })
}

fn encode_text(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    match &request.value {
        Value::String(s) => Ok(WireValue::new(request.type_tag.clone(), Value::String(s.clone()))),
        other => Err(CodecError::malformed(&request.type_tag, format!("not a string: {other}"))),
    }
}

fn encode_principal(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    let Value::String(s) = &request.value else {
        return Err(CodecError::malformed(
            tags::PRINCIPAL,
            format!("not a string: {}", request.value),
        ));
    };
    // `address.contract-name` is a contract principal; both halves must be
    // present. A bare address is a standard principal.
    if let Some((address, contract_name)) = s.split_once('.') {
        if address.is_empty() || contract_name.is_empty() {
            return Err(CodecError::malformed(
                tags::PRINCIPAL,
                format!("contract principal missing address or name: {s}"),
            ));
        }
    } else if s.is_empty() {
        return Err(CodecError::malformed(tags::PRINCIPAL, "empty principal"));
    }
    Ok(WireValue::new(tags::PRINCIPAL, Value::String(s.clone())))
}

fn encode_tuple(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    let Value::Object(fields) = &request.value else {
        return Err(CodecError::malformed(
            &request.type_tag,
            format!("tuple value is not an object: {}", request.value),
        ));
    };
    let mut payload = serde_json::Map::with_capacity(fields.len());
    for (name, raw) in fields {
        let inner = nested_request(raw, &request.type_tag, name)?;
        let wire = encode(&inner)?;
        payload.insert(name.clone(), to_payload(&wire));
    }
    Ok(WireValue::new(request.type_tag.clone(), Value::Object(payload)))
}

fn encode_list(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    let Value::Array(items) = &request.value else {
        return Err(CodecError::malformed(
            tags::LIST,
            format!("list value is not an array: {}", request.value),
        ));
    };
    let mut payload = Vec::with_capacity(items.len());
    for (index, raw) in items.iter().enumerate() {
        let inner = nested_request(raw, tags::LIST, &index.to_string())?;
        payload.push(to_payload(&encode(&inner)?));
    }
    Ok(WireValue::new(tags::LIST, Value::Array(payload)))
}

fn encode_optional(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    if request.value.is_null() {
        return Ok(WireValue::new(tags::OPTIONAL, Value::Null));
    }
    let inner = nested_request(&request.value, tags::OPTIONAL, "inner")?;
    Ok(WireValue::new(tags::OPTIONAL, to_payload(&encode(&inner)?)))
}

fn encode_buffer(request: &EncodeRequest) -> Result<WireValue, CodecError> {
    let Value::String(s) = &request.value else {
        return Err(CodecError::malformed(
            tags::BUFFER,
            format!("not a hex string: {}", request.value),
        ));
    };
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| {
        CodecError::malformed(tags::BUFFER, format!("invalid hex: {e}"))
    })?;
    Ok(WireValue::new(tags::BUFFER, Value::String(stripped.to_ascii_lowercase())))
}

fn nested_request(raw: &Value, parent: &str, field: &str) -> Result<EncodeRequest, CodecError> {
    serde_json::from_value(raw.clone()).map_err(|_| {
        CodecError::malformed(parent, format!("field {field} is not a type/value descriptor"))
    })
}

fn to_payload(wire: &WireValue) -> Value {
    serde_json::to_value(wire).unwrap_or(Value::Null)
}
