// crates/agentgate-client/src/transport.rs
// ============================================================================
// Module: HTTP Transport
// Description: Shared request execution with retry for inspection clients.
// Purpose: Post JSON bodies with timeout, retry, and classified failures.
// Dependencies: reqwest, serde_json, tracing, url, agentgate-core
// ============================================================================

//! ## Overview
//! Both inspection channels and the gateway client post JSON and read JSON
//! back; this module owns that loop once, in a blocking and an async form
//! sharing the same classification rules. Connection pools are built lazily
//! on first use and shared process-wide. Failures come back as a
//! [`TransportError`], which callers turn into the public error taxonomy
//! after applying their fail-open policy: timeouts, connection failures, and
//! exhausted retryable statuses are fail-open eligible, decode failures and
//! non-retryable statuses never are.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::warn;
use url::Url;

use agentgate_core::ConfigError;
use agentgate_core::Decision;
use agentgate_core::InspectError;

use crate::retry::RetryPlan;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the inspection API key (`X-AgentGate-API-Key` on the wire).
pub const INSPECTION_API_KEY_HEADER: &str = "x-agentgate-api-key";
/// Header carrying the gateway API key.
pub const GATEWAY_API_KEY_HEADER: &str = "api-key";
/// Path of the chat inspection endpoint.
pub const CHAT_INSPECT_PATH: &str = "/v1/inspect/chat";
/// Path of the MCP inspection endpoint.
pub const MCP_INSPECT_PATH: &str = "/v1/inspect/mcp";

/// Maximum body excerpt carried in remote-status errors, in characters.
const BODY_EXCERPT_LEN: usize = 512;

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Classified failure of one transport exchange, after retries.
#[derive(Debug, Error)]
pub(crate) enum TransportError {
    /// Every attempt exceeded the timeout.
    #[error("timed out: {0}")]
    Timeout(String),
    /// Every attempt failed to connect or exhausted retryable statuses.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The response body was not the expected JSON. Never retried.
    #[error("decode failure: {0}")]
    Decode(String),
    /// A non-2xx status outside the retry set. Never retried.
    #[error("remote status {status}")]
    Remote {
        /// HTTP status of the final response.
        status: u16,
        /// Body excerpt of the final response.
        message: String,
    },
}

impl TransportError {
    /// Whether a fail-open caller may swallow this failure.
    pub(crate) const fn fail_open_eligible(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unavailable(_))
    }

    /// Human-readable description of the failure.
    pub(crate) fn message(&self) -> &str {
        match self {
            Self::Timeout(message)
            | Self::Unavailable(message)
            | Self::Decode(message)
            | Self::Remote {
                message, ..
            } => message,
        }
    }

    /// Converts into the public taxonomy, attaching the fail-closed verdict
    /// to the eligible variants.
    pub(crate) fn into_inspect_error(self, decision: Decision) -> InspectError {
        match self {
            Self::Timeout(message) => InspectError::Timeout {
                message,
                decision,
            },
            Self::Unavailable(message) => InspectError::Network {
                message,
                decision,
            },
            Self::Decode(message) => InspectError::Decode(message),
            Self::Remote {
                status,
                message,
            } => InspectError::Remote {
                status,
                message,
            },
        }
    }
}

// ============================================================================
// SECTION: Endpoint Handling
// ============================================================================

/// Normalizes a configured endpoint to its service base URL.
///
/// Trailing slashes are stripped, and a configured URL that already names an
/// inspection path is reduced to its base so path joining stays idempotent.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the endpoint is not a valid
/// absolute URL.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    Url::parse(endpoint).map_err(|_| ConfigError::InvalidValue {
        field: "endpoint".to_string(),
        value: endpoint.to_string(),
    })?;
    let mut base = endpoint.trim_end_matches('/').to_string();
    for path in [CHAT_INSPECT_PATH, MCP_INSPECT_PATH] {
        if let Some(stripped) = base.strip_suffix(path) {
            base = stripped.to_string();
            break;
        }
    }
    Ok(base)
}

/// Builds the JSON request headers with an API-key header.
pub(crate) fn api_key_headers(
    header_name: &'static str,
    api_key: &str,
) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let value = HeaderValue::from_str(api_key)
        .map_err(|_| TransportError::Unavailable("api key is not a valid header value".to_string()))?;
    headers.insert(HeaderName::from_static(header_name), value);
    Ok(headers)
}

// ============================================================================
// SECTION: Connection Pools
// ============================================================================

/// Shared blocking pool, built on first successful construction.
static BLOCKING_POOL: OnceLock<reqwest::blocking::Client> = OnceLock::new();
/// Shared async pool, built on first successful construction.
static ASYNC_POOL: OnceLock<reqwest::Client> = OnceLock::new();

/// Returns the shared blocking client.
///
/// Construction failures are not cached; the next caller retries.
fn blocking_pool() -> Result<reqwest::blocking::Client, TransportError> {
    if let Some(client) = BLOCKING_POOL.get() {
        return Ok(client.clone());
    }
    let client = reqwest::blocking::Client::builder()
        .build()
        .map_err(|err| TransportError::Unavailable(err.to_string()))?;
    Ok(BLOCKING_POOL.get_or_init(|| client).clone())
}

/// Returns the shared async client.
///
/// Construction failures are not cached; the next caller retries.
fn async_pool() -> Result<reqwest::Client, TransportError> {
    if let Some(client) = ASYNC_POOL.get() {
        return Ok(client.clone());
    }
    let client = reqwest::Client::builder()
        .build()
        .map_err(|err| TransportError::Unavailable(err.to_string()))?;
    Ok(ASYNC_POOL.get_or_init(|| client).clone())
}

// ============================================================================
// SECTION: Attempt Classification
// ============================================================================

/// Outcome of a single attempt.
enum Attempt {
    /// Parsed JSON body of a 2xx response.
    Done(Value),
    /// Transient failure worth another attempt.
    Retryable(String),
    /// The attempt timed out.
    TimedOut(String),
    /// Permanent failure; stop immediately.
    Fatal(TransportError),
}

/// Classifies a request error.
fn classify_send_error(err: &reqwest::Error) -> Attempt {
    if err.is_timeout() {
        Attempt::TimedOut(err.to_string())
    } else {
        Attempt::Retryable(err.to_string())
    }
}

/// Classifies a non-2xx status against the plan.
fn classify_status(plan: &RetryPlan, status: u16, body: String) -> Attempt {
    if plan.retries_status(status) {
        Attempt::Retryable(format!("status {status}"))
    } else {
        let message: String = body.chars().take(BODY_EXCERPT_LEN).collect();
        Attempt::Fatal(TransportError::Remote {
            status,
            message,
        })
    }
}

/// Folds the final attempt outcome into a transport error.
fn exhausted(timed_out: bool, message: String) -> TransportError {
    if timed_out {
        TransportError::Timeout(message)
    } else {
        TransportError::Unavailable(message)
    }
}

// ============================================================================
// SECTION: Blocking Execution
// ============================================================================

/// Posts a JSON body, retrying per the plan.
pub(crate) fn post_json(
    url: &str,
    headers: HeaderMap,
    body: &Value,
    timeout: Duration,
    plan: &RetryPlan,
) -> Result<Value, TransportError> {
    let client = blocking_pool()?;
    let mut last_message = String::new();
    let mut last_timed_out = false;

    for attempt in 0..plan.total() {
        if attempt > 0 {
            let delay = plan.backoff_delay(attempt - 1);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            warn!(url, attempt, "retrying inspection call");
        }
        debug!(url, attempt, "posting inspection call");

        let result = client
            .post(url)
            .headers(headers.clone())
            .timeout(timeout)
            .json(body)
            .send();
        let outcome = match result {
            Err(err) => classify_send_error(&err),
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text() {
                    Err(err) => classify_send_error(&err),
                    Ok(text) if (200..300).contains(&status) => {
                        match serde_json::from_str(&text) {
                            Ok(value) => Attempt::Done(value),
                            Err(err) => Attempt::Fatal(TransportError::Decode(err.to_string())),
                        }
                    }
                    Ok(text) => classify_status(plan, status, text),
                }
            }
        };

        match outcome {
            Attempt::Done(value) => return Ok(value),
            Attempt::Fatal(err) => return Err(err),
            Attempt::Retryable(message) => {
                last_message = message;
                last_timed_out = false;
            }
            Attempt::TimedOut(message) => {
                last_message = message;
                last_timed_out = true;
            }
        }
    }
    Err(exhausted(last_timed_out, last_message))
}

// ============================================================================
// SECTION: Async Execution
// ============================================================================

/// Async twin of [`post_json`] with identical classification.
pub(crate) async fn post_json_async(
    url: &str,
    headers: HeaderMap,
    body: &Value,
    timeout: Duration,
    plan: &RetryPlan,
) -> Result<Value, TransportError> {
    let client = async_pool()?;
    let mut last_message = String::new();
    let mut last_timed_out = false;

    for attempt in 0..plan.total() {
        if attempt > 0 {
            let delay = plan.backoff_delay(attempt - 1);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            warn!(url, attempt, "retrying inspection call");
        }
        debug!(url, attempt, "posting inspection call");

        let result = client
            .post(url)
            .headers(headers.clone())
            .timeout(timeout)
            .json(body)
            .send()
            .await;
        let outcome = match result {
            Err(err) => classify_send_error(&err),
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Err(err) => classify_send_error(&err),
                    Ok(text) if (200..300).contains(&status) => {
                        match serde_json::from_str(&text) {
                            Ok(value) => Attempt::Done(value),
                            Err(err) => Attempt::Fatal(TransportError::Decode(err.to_string())),
                        }
                    }
                    Ok(text) => classify_status(plan, status, text),
                }
            }
        };

        match outcome {
            Attempt::Done(value) => return Ok(value),
            Attempt::Fatal(err) => return Err(err),
            Attempt::Retryable(message) => {
                last_message = message;
                last_timed_out = false;
            }
            Attempt::TimedOut(message) => {
                last_message = message;
                last_timed_out = true;
            }
        }
    }
    Err(exhausted(last_timed_out, last_message))
}
