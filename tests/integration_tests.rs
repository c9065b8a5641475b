//! Integration tests using mock HTTP server
//!
//! Tests the full flow: SafeClient → CallGate → HttpTransport → mock Kraken API

use kraken_safe::transport::{ETIMEDOUT, REQUEST_ERROR};
use kraken_safe::{Error, SafeClient, SafeClientConfig, TransportError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, max_tries: u32) -> SafeClientConfig {
    SafeClientConfig::builder()
        .credentials("integration-key", "integration-secret")
        .base_url(server.uri())
        .max_tries(max_tries)
        .counter_dec_interval(Duration::from_millis(100))
        .timeout(Duration::from_secs(5))
        .build()
}

fn ok_envelope(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"error": [], "result": result}))
}

// ============================================================================
// Success Path
// ============================================================================

#[tokio::test]
async fn test_public_call_returns_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/public/Ticker"))
        .and(query_param("pair", "XXBTZUSD"))
        .respond_with(ok_envelope(json!({"XXBTZUSD": {"a": ["30000.1", "1", "1.000"]}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SafeClient::http(&config_for(&mock_server, 1)).unwrap();
    let ticker = client
        .api("Ticker", vec![json!({"pair": "XXBTZUSD"})])
        .await
        .unwrap();

    assert_eq!(ticker["XXBTZUSD"]["a"][0], "30000.1");
    assert_eq!(client.counter().value(), 2);
}

#[tokio::test]
async fn test_private_call_sends_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/0/private/Balance"))
        .and(header("API-Key", "integration-key"))
        .respond_with(ok_envelope(json!({"ZUSD": "100.0000"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SafeClient::http(&config_for(&mock_server, 1)).unwrap();
    let balance = client.api("Balance", vec![]).await.unwrap();

    assert_eq!(balance["ZUSD"], "100.0000");
}

// ============================================================================
// Retry Behaviour
// ============================================================================

#[tokio::test]
async fn test_retries_overloaded_responses() {
    let mock_server = MockServer::start().await;

    // First two calls hit an overloaded edge, third succeeds
    Mock::given(method("GET"))
        .and(path("/0/public/Time"))
        .respond_with(ResponseTemplate::new(520).set_body_string("origin error"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/0/public/Time"))
        .respond_with(ok_envelope(json!({"unixtime": 1_700_000_000})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SafeClient::http(&config_for(&mock_server, 3)).unwrap();
    let time = client.api("Time", vec![]).await.unwrap();

    assert_eq!(time["unixtime"], 1_700_000_000);
}

#[tokio::test]
async fn test_exhausts_on_persistent_overload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/0/private/OpenOrders"))
        .respond_with(ResponseTemplate::new(520))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = SafeClient::http(&config_for(&mock_server, 2)).unwrap();
    let err = client
        .api("OpenOrders", vec![json!({"trades": true})])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Exhausted { attempts: 2, .. }));
    assert_eq!(
        err.to_string(),
        r#"kraken api call ["OpenOrders",{"trades":true}] failed after 2 tries"#
    );
}

#[tokio::test]
async fn test_retries_request_timeouts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/public/SystemStatus"))
        .respond_with(ok_envelope(json!({"status": "online"})).set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = SafeClientConfig::builder()
        .base_url(mock_server.uri())
        .max_tries(2)
        .timeout(Duration::from_millis(50))
        .build();
    let client = SafeClient::http(&config).unwrap();

    let err = client.api("SystemStatus", vec![]).await.unwrap_err();

    assert_eq!(err.attempts(), Some(2));
}

#[tokio::test]
async fn test_fatal_status_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/public/Depth"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SafeClient::http(&config_for(&mock_server, 5)).unwrap();
    let err = client.api("Depth", vec![]).await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.original(), Some(&TransportError::status(404, "Not Found")));
}

#[tokio::test]
async fn test_api_error_envelope_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/0/private/AddOrder"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": ["EOrder:Insufficient funds"]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SafeClient::http(&config_for(&mock_server, 3)).unwrap();
    let err = client
        .api(
            "AddOrder",
            vec![json!({"pair": "XXBTZUSD", "type": "buy", "volume": "1"})],
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Rethrowing the \"EOrder:Insufficient funds\" error"
    );
}

#[tokio::test]
async fn test_connection_refused_is_fatal() {
    // Nothing listens on the discard port
    let config = SafeClientConfig::builder()
        .base_url("http://127.0.0.1:9")
        .max_tries(3)
        .build();
    let client = SafeClient::http(&config).unwrap();

    let err = client.api("Time", vec![]).await.unwrap_err();

    let original = err.original().unwrap();
    assert_eq!(original.name(), Some(REQUEST_ERROR));
    assert_ne!(original.code(), Some(ETIMEDOUT));
    assert_eq!(client.counter().value(), 2);
}

// ============================================================================
// Shared Budget
// ============================================================================

#[tokio::test]
async fn test_concurrent_calls_are_throttled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/public/Time"))
        .respond_with(ok_envelope(json!({"unixtime": 1})))
        .expect(8)
        .mount(&mock_server)
        .await;

    // limit 4, cost 2: three calls pass immediately, the rest wait for
    // 50ms ticks draining 2 units each
    let config = SafeClientConfig::builder()
        .base_url(mock_server.uri())
        .counter_limit(4)
        .counter_dec_interval(Duration::from_millis(50))
        .counter_dec_step(2)
        .build();
    let client = Arc::new(SafeClient::http(&config).unwrap());

    let start = std::time::Instant::now();
    let calls: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.api("Time", vec![]).await })
        })
        .collect();
    for call in calls {
        call.await.unwrap().unwrap();
    }

    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = SafeClientConfig::builder().max_tries(0).build();
    let result = SafeClient::http(&config);
    assert!(matches!(result, Err(Error::InvalidConfigValue { .. })));
}
