// crates/agentgate-client/tests/gateway.rs
// ============================================================================
// Module: Gateway Client Tests
// Description: Tests for gateway forwarding against a local server.
// ============================================================================
//! ## Overview
//! Validates forwarding, the gateway API-key header, fail-open annotation,
//! and the fail-closed error carrying a block verdict.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(
    clippy::field_reassign_with_default,
    reason = "Tests build option sets field by field for readability."
)]

use std::net::TcpListener;
use std::thread;
use std::thread::JoinHandle;

use agentgate_client::GatewayClient;
use agentgate_config::ConfigState;
use agentgate_config::GatewayEntry;
use agentgate_config::InitOptions;
use agentgate_core::GatewaySettings;
use agentgate_core::InspectError;
use agentgate_core::InspectionScope;
use agentgate_core::RetryPolicy;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// One request observed by the loopback gateway.
struct Recorded {
    /// Parsed JSON request body.
    body: Value,
    /// Value of the gateway API-key header, when sent.
    api_key: Option<String>,
}

/// Serves scripted responses and records what was received.
fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<Recorded>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let mut request = server.recv().unwrap();
            let mut raw = String::new();
            request.as_reader().read_to_string(&mut raw).unwrap();
            let api_key = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("api-key"))
                .map(|header| header.value.as_str().to_string());
            seen.push(Recorded {
                body: serde_json::from_str(&raw).unwrap_or(Value::Null),
                api_key,
            });
            request
                .respond(tiny_http::Response::from_string(body).with_status_code(status))
                .unwrap();
        }
        seen
    });
    (url, handle)
}

/// Reserves a loopback port with nothing listening on it.
fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Settings for one attempt with no backoff against a URL.
fn quick_settings(url: &str, fail_open: bool) -> GatewaySettings {
    GatewaySettings {
        api_key: Some("gw-key".to_string()),
        fail_open,
        timeout_secs: 2,
        retry: RetryPolicy {
            total: 1,
            backoff_factor: 0.0,
            status_codes: [503].into_iter().collect(),
        },
        ..GatewaySettings::new(url)
    }
}

// ============================================================================
// SECTION: Forwarding
// ============================================================================

#[test]
fn test_forwarding_returns_the_gateway_body() {
    let (url, handle) = serve(vec![(
        200,
        json!({"choices": [{"message": {"content": "hi"}}]}).to_string(),
    )]);
    let client = GatewayClient::new(quick_settings(&url, true));

    let body = client
        .call(&json!({"model": "gpt-4o", "messages": []}))
        .unwrap();
    assert!(body.get("choices").is_some());

    let seen = handle.join().unwrap();
    assert_eq!(seen[0].api_key.as_deref(), Some("gw-key"));
    assert_eq!(seen[0].body.get("model"), Some(&json!("gpt-4o")));
}

#[test]
fn test_caller_headers_never_shadow_the_gateway_key() {
    let (url, handle) = serve(vec![(200, json!({}).to_string())]);
    let client = GatewayClient::new(quick_settings(&url, true));

    let extra = vec![
        ("x-request-id".to_string(), "req-7".to_string()),
        ("api-key".to_string(), "spoofed".to_string()),
    ];
    client.call_with_headers(&json!({}), &extra).unwrap();

    let seen = handle.join().unwrap();
    assert_eq!(seen[0].api_key.as_deref(), Some("gw-key"));
}

#[test]
fn test_non_retryable_status_is_a_remote_error() {
    let (url, handle) = serve(vec![(401, "unauthorized".to_string())]);
    let client = GatewayClient::new(quick_settings(&url, true));

    let err = client.call(&json!({})).unwrap_err();
    assert!(matches!(err, InspectError::Remote { status: 401, .. }));
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Fail-Open Policy
// ============================================================================

#[test]
fn test_fail_open_annotates_a_synthetic_body() {
    let client = GatewayClient::new(quick_settings(&closed_url(), true));
    let body = client.call(&json!({"model": "gpt-4o"})).unwrap();
    assert_eq!(body.get("fail_open"), Some(&json!(true)));
    assert!(body.get("error").is_some());
}

#[test]
fn test_fail_closed_raises_with_a_block_verdict() {
    let client = GatewayClient::new(quick_settings(&closed_url(), false));
    let err = client.call(&json!({"model": "gpt-4o"})).unwrap_err();
    assert!(!err.decision().unwrap().allows());
    assert!(matches!(err, InspectError::GatewayUnavailable { .. }));
}

// ============================================================================
// SECTION: Provider Resolution
// ============================================================================

#[test]
fn test_for_provider_honors_the_active_gateway() {
    let mut options = InitOptions {
        llm_integration_mode: Some("gateway".to_string()),
        ..InitOptions::default()
    };
    options.gateway_mode.llm_gateways.register(
        "primary",
        GatewayEntry {
            gateway_url: Some("https://primary.example.com".to_string()),
            provider: Some("openai".to_string()),
            default: true,
            ..GatewayEntry::default()
        },
    );
    options.gateway_mode.llm_gateways.register(
        "canary",
        GatewayEntry {
            gateway_url: Some("https://canary.example.com".to_string()),
            ..GatewayEntry::default()
        },
    );
    let mut state = ConfigState::new();
    state.init(options).unwrap();

    let scope = InspectionScope::new();
    let client = GatewayClient::for_provider(&state, "openai", Some(&scope))
        .unwrap()
        .unwrap();
    assert_eq!(client.settings().url, "https://primary.example.com");

    let _guard = scope.with_gateway("canary");
    let client = GatewayClient::for_provider(&state, "openai", Some(&scope))
        .unwrap()
        .unwrap();
    assert_eq!(client.settings().url, "https://canary.example.com");
}

// ============================================================================
// SECTION: Async Parity
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_async_forwarding_matches_sync_behavior() {
    let (url, handle) = serve(vec![(200, json!({"choices": []}).to_string())]);
    let client = GatewayClient::new(quick_settings(&url, true));

    let body = client.call_async(&json!({"model": "gpt-4o"})).await.unwrap();
    assert!(body.get("choices").is_some());
    handle.join().unwrap();
}
