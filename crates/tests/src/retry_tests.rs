//! Retry behavior against live mock upstreams.
//!
//! These tests sleep through the real backoff delays on purpose: the timing
//! assertions are the point.

use std::time::{Duration, Instant};

use serde_json::json;
use strata_core::{
    contract::{call_read_only, call_read_only_strict, ReadOnlyCall},
    upstream::{ApiClient, ApiClientConfig, CallClass, UpstreamError},
    values::DecodedValue,
};

use crate::mock_upstream::{MockUpstream, ScriptedResponse};

fn client_for(url: String) -> ApiClient {
    ApiClient::new(ApiClientConfig { base_url: url, ..ApiClientConfig::default() }).unwrap()
}

fn ok_json(body: serde_json::Value) -> ScriptedResponse {
    ScriptedResponse::new(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
}

#[tokio::test(flavor = "multi_thread")]
async fn rate_limited_twice_then_succeeds_on_third_attempt() {
    let upstream = MockUpstream::start(vec![
        ScriptedResponse::new(429).with_header("retry-after", "2"),
        ScriptedResponse::new(429).with_header("retry-after", "2"),
        ok_json(json!({"ready": true})),
    ])
    .await;
    let client = client_for(upstream.url());

    let started = Instant::now();
    let value = client.get_json("/v2/info", CallClass::Entity).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(value, json!({"ready": true}));
    assert_eq!(upstream.hits(), 3);
    // Two Retry-After sleeps of 2s each.
    assert!(elapsed >= Duration::from_millis(3900), "only waited {elapsed:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_rate_limit_surfaces_advisory_delay() {
    let upstream = MockUpstream::start(vec![
        ScriptedResponse::new(429).with_header("retry-after", "1"),
        ScriptedResponse::new(429).with_header("retry-after", "1"),
        ScriptedResponse::new(429).with_header("retry-after", "7"),
    ])
    .await;
    let client = client_for(upstream.url());

    let err = client.get_json("/v2/info", CallClass::Entity).await.unwrap_err();

    assert_eq!(upstream.hits(), 3);
    match err {
        UpstreamError::RateLimitExceeded { retry_after_secs } => {
            assert_eq!(retry_after_secs, 7);
        }
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_back_off_exponentially_then_succeed() {
    let upstream = MockUpstream::start(vec![
        ScriptedResponse::new(500).with_body("boom"),
        ScriptedResponse::new(502).with_body("bad gateway"),
        ok_json(json!({"recovered": true})),
    ])
    .await;
    let client = client_for(upstream.url());

    let started = Instant::now();
    let value = client.get_json("/v2/info", CallClass::Entity).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(value, json!({"recovered": true}));
    assert_eq!(upstream.hits(), 3);
    // Backoff sleeps: 1s then 2s.
    assert!(elapsed >= Duration::from_millis(2900), "only waited {elapsed:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_server_errors_become_unavailable() {
    let upstream = MockUpstream::start(vec![
        ScriptedResponse::new(503),
        ScriptedResponse::new(503),
        ScriptedResponse::new(503),
    ])
    .await;
    let client = client_for(upstream.url());

    let err = client.get_json("/v2/info", CallClass::Entity).await.unwrap_err();

    assert_eq!(upstream.hits(), 3);
    assert!(matches!(err, UpstreamError::Unavailable { attempts: 3, .. }), "got {err:?}");
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/info")
        .with_status(400)
        .with_body("bad request")
        .expect(1)
        .create_async()
        .await;
    let client = client_for(server.url());

    let err = client.get_json("/v2/info", CallClass::Entity).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, UpstreamError::Status { status: 400, .. }), "got {err:?}");
}

#[tokio::test]
async fn success_with_invalid_json_is_permanent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/info")
        .with_status(200)
        .with_body("<html>not json</html>")
        .expect(1)
        .create_async()
        .await;
    let client = client_for(server.url());

    let err = client.get_json("/v2/info", CallClass::Entity).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, UpstreamError::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn read_only_call_round_trips_through_the_codec() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock(
            "POST",
            "/v2/contracts/call-read/SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7/event-registry/get-event",
        )
        .match_body(mockito::Matcher::PartialJson(json!({
            "arguments": [{"tag": "uint", "payload": "7"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "tag": "(response (tuple (event-id uint) (is-active bool)) uint)",
                "success": true,
                "payload": {
                    "event-id": {"tag": "uint", "payload": "7"},
                    "is-active": {"tag": "bool", "payload": true}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let client = client_for(server.url());

    let call = ReadOnlyCall {
        contract_id: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.event-registry".to_string(),
        function: "get-event".to_string(),
        sender: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7".to_string(),
        arguments: vec![json!({"type": "uint", "value": "7"})],
    };
    let decoded = call_read_only(&client, &call).await.unwrap();

    mock.assert_async().await;
    assert_eq!(decoded.to_json(), json!({"event-id": "7", "is-active": true}));
}

#[tokio::test]
async fn strict_read_only_call_raises_contract_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock(
            "POST",
            "/v2/contracts/call-read/SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7/event-registry/get-event",
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "tag": "(response bool uint)",
                "success": false,
                "payload": {"tag": "uint", "payload": "404"}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let client = client_for(server.url());

    let call = ReadOnlyCall {
        contract_id: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.event-registry".to_string(),
        function: "get-event".to_string(),
        sender: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7".to_string(),
        arguments: vec![],
    };

    // Permissive decode treats the err as absent data.
    let permissive = call_read_only(&client, &call).await.unwrap();
    assert_eq!(permissive, DecodedValue::none());

    // Strict decode surfaces the err payload.
    let err = call_read_only_strict(&client, &call).await.unwrap_err();
    assert!(err.to_string().contains("404"), "got {err}");
}
