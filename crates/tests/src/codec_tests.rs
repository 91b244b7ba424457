//! End-to-end scenarios across the value codec.

use serde_json::json;
use strata_core::values::{
    decode, decode_strict, encode, encode_all, DecodedValue, EncodeRequest, WireValue,
};

fn wire(v: serde_json::Value) -> WireValue {
    serde_json::from_value(v).unwrap()
}

#[test]
fn event_tuple_decodes_to_plain_json() {
    let value = wire(json!({
        "tag": "tuple",
        "payload": {
            "event-id": {"tag": "uint", "payload": "7"},
            "is-active": {"tag": "bool", "payload": true}
        }
    }));
    assert_eq!(decode(&value).to_json(), json!({"event-id": "7", "is-active": true}));
}

#[test]
fn realistic_registry_entry_decodes_recursively() {
    let value = wire(json!({
        "tag": "(response (tuple (name (string-ascii 46)) (owner principal) (meta (optional (buffer 32))) (tickets (list 10 uint))) uint)",
        "success": true,
        "payload": {
            "name": {"tag": "(string-ascii 46)", "payload": "summer-festival"},
            "owner": {"tag": "principal", "payload": "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"},
            "meta": {"tag": "optional", "payload": {"tag": "buffer", "payload": "c0ffee"}},
            "tickets": {"tag": "list", "payload": [
                {"tag": "uint", "payload": "1"},
                {"tag": "uint", "payload": "2"}
            ]}
        }
    }));

    assert_eq!(
        decode(&value).to_json(),
        json!({
            "name": "summer-festival",
            "owner": "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7",
            "meta": "c0ffee",
            "tickets": ["1", "2"]
        })
    );
}

#[test]
fn unknown_tag_never_panics_and_passes_payload_through() {
    let value = wire(json!({"tag": "bizarre", "payload": "x"}));
    assert_eq!(decode(&value), DecodedValue::Raw(json!("x")));

    let nested = wire(json!({"tag": "tuple", "payload": {"weird": {"tag": "???", "payload": 9}}}));
    assert_eq!(decode(&nested).to_json(), json!({"weird": 9}));
}

#[test]
fn response_detection_by_tag_and_by_success_agree() {
    let tagged = wire(json!({
        "tag": "(response (tuple (a uint)) uint)",
        "success": true,
        "payload": {"a": {"tag": "uint", "payload": "5"}}
    }));
    // No tag at all: only the sibling success flag marks this as a response.
    let flagged = wire(json!({
        "success": true,
        "payload": {"a": {"tag": "uint", "payload": "5"}}
    }));
    assert_eq!(decode(&tagged), decode(&flagged));
}

#[test]
fn err_responses_split_by_mode() {
    let value = wire(json!({
        "tag": "(response uint uint)",
        "success": false,
        "payload": {"tag": "uint", "payload": "404"}
    }));

    assert_eq!(decode(&value), DecodedValue::none());
    let err = decode_strict(&value).unwrap_err();
    assert_eq!(err.err, json!({"tag": "uint", "payload": "404"}));
}

#[test]
fn full_argument_set_round_trips() {
    let arguments = vec![
        json!({"type": "uint", "value": "340282366920938463463374607431768211455"}),
        json!({"type": "int", "value": "-170141183460469231731687303715884105728"}),
        json!({"type": "bool", "value": "true"}),
        json!({"type": "(string-utf8 64)", "value": "stacks ⚡"}),
        json!({"type": "principal", "value": "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.registry"}),
        json!({"type": "buffer", "value": "0x00ff"}),
        json!({"type": "optional", "value": {"type": "uint", "value": "9"}}),
        json!({"type": "list", "value": [
            {"type": "uint", "value": "1"},
            {"type": "uint", "value": "2"}
        ]}),
        json!({"type": "tuple", "value": {
            "id": {"type": "uint", "value": "7"},
            "label": {"type": "string-ascii", "value": "vip"}
        }}),
    ];

    let encoded = encode_all(&arguments);
    assert_eq!(encoded.len(), arguments.len(), "all arguments must encode");

    let decoded: Vec<_> = encoded.iter().map(decode).collect();
    assert_eq!(decoded[0], DecodedValue::Integer(u128::MAX.to_string()));
    assert_eq!(decoded[1], DecodedValue::Integer(i128::MIN.to_string()));
    assert_eq!(decoded[2], DecodedValue::Bool(true));
    assert_eq!(decoded[3], DecodedValue::Text("stacks ⚡".to_string()));
    assert_eq!(
        decoded[4],
        DecodedValue::Principal("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.registry".to_string())
    );
    assert_eq!(decoded[5], DecodedValue::Bytes("00ff".to_string()));
    assert_eq!(decoded[6], DecodedValue::some(DecodedValue::Integer("9".to_string())));
    assert_eq!(
        decoded[7],
        DecodedValue::List(vec![
            DecodedValue::Integer("1".to_string()),
            DecodedValue::Integer("2".to_string()),
        ])
    );
    assert_eq!(
        decoded[8],
        DecodedValue::Tuple(vec![
            ("id".to_string(), DecodedValue::Integer("7".to_string())),
            ("label".to_string(), DecodedValue::Text("vip".to_string())),
        ])
    );
}

#[test]
fn encode_failures_are_isolated_per_argument() {
    let arguments = vec![
        json!({"type": "uint", "value": "1"}),
        json!({"type": "list", "value": "not-an-array"}),
        json!({"type": "uint", "value": "2"}),
    ];
    let encoded = encode_all(&arguments);
    assert_eq!(encoded.len(), 2);

    // Strict all-or-nothing semantics stay available through `encode`.
    let err = encode(&EncodeRequest::new("list", json!("not-an-array"))).unwrap_err();
    assert!(err.to_string().contains("list"));
}

#[test]
fn decoded_values_serialize_like_their_json_rendering() {
    let value = wire(json!({
        "tag": "tuple",
        "payload": {
            "ok": {"tag": "bool", "payload": true},
            "none": {"tag": "optional", "payload": null}
        }
    }));
    let decoded = decode(&value);
    assert_eq!(serde_json::to_value(&decoded).unwrap(), decoded.to_json());
}
