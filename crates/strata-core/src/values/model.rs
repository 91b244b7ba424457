use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;

/// The application-native form of a decoded chain value.
///
/// Integers are kept as decimal strings rather than native floats so values
/// above 2^53 survive a trip through JSON without precision loss. Tuples
/// preserve the field order of the source value; the order is not
/// semantically significant.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// Arbitrary-precision integer rendered as a decimal string.
    Integer(String),
    Bool(bool),
    /// `string-ascii` / `string-utf8` content, passed through unchanged.
    Text(String),
    /// A standard (`SP…`/`ST…`) or contract (`address.name`) principal.
    Principal(String),
    /// Ordered record of named fields.
    Tuple(Vec<(String, DecodedValue)>),
    List(Vec<DecodedValue>),
    /// `optional` and unwrapped err-responses decode to `None`.
    Optional(Option<Box<DecodedValue>>),
    /// Buffer contents as the hex string supplied on the wire.
    Bytes(String),
    /// Defensive passthrough for unrecognized tags.
    Raw(Value),
}

impl DecodedValue {
    pub fn none() -> Self {
        DecodedValue::Optional(None)
    }

    pub fn some(inner: DecodedValue) -> Self {
        DecodedValue::Optional(Some(Box::new(inner)))
    }

    /// Renders the value as plain JSON: tuples become objects (field order
    /// preserved), lists become arrays, `Optional(None)` becomes null.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            DecodedValue::Integer(s) | DecodedValue::Text(s) | DecodedValue::Principal(s) |
            DecodedValue::Bytes(s) => Value::String(s.clone()),
            DecodedValue::Bool(b) => Value::Bool(*b),
            DecodedValue::Tuple(fields) => {
                let mut map = serde_json::Map::with_capacity(fields.len());
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json());
                }
                Value::Object(map)
            }
            DecodedValue::List(items) => {
                Value::Array(items.iter().map(DecodedValue::to_json).collect())
            }
            DecodedValue::Optional(inner) => {
                inner.as_ref().map_or(Value::Null, |v| v.to_json())
            }
            DecodedValue::Raw(value) => value.clone(),
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Integer(s) | DecodedValue::Text(s) | DecodedValue::Principal(s) |
            DecodedValue::Bytes(s) => serializer.serialize_str(s),
            DecodedValue::Bool(b) => serializer.serialize_bool(*b),
            DecodedValue::Tuple(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            DecodedValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DecodedValue::Optional(inner) => match inner {
                Some(v) => v.serialize(serializer),
                None => serializer.serialize_none(),
            },
            DecodedValue::Raw(value) => value.serialize(serializer),
        }
    }
}
