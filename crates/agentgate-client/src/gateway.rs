// crates/agentgate-client/src/gateway.rs
// ============================================================================
// Module: Gateway Client
// Description: Forwarding client for gateway-mode protected calls.
// Purpose: Send provider payloads through a security gateway with retry.
// Dependencies: serde_json, tokio, tracing, agentgate-core, agentgate-config
// ============================================================================

//! ## Overview
//! In gateway mode the protected call itself is forwarded through the
//! security gateway, which inspects and either proxies or refuses it. The
//! client takes fully resolved [`GatewaySettings`], so every timeout, retry,
//! and fail-open question was answered before the first byte is sent. A
//! fail-open gateway failure yields a synthetic body annotating the error
//! with `"fail_open": true`; a fail-closed one raises with a block verdict
//! attached. Authentication modes other than `api_key` rely on ambient
//! deployment credentials and add no header here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use serde_json::Value;
use serde_json::json;
use tracing::warn;

use agentgate_config::ConfigState;
use agentgate_config::resolve_for_provider;
use agentgate_core::AuthMode;
use agentgate_core::ConfigError;
use agentgate_core::Decision;
use agentgate_core::GatewaySettings;
use agentgate_core::InspectError;
use agentgate_core::InspectionScope;

use crate::retry::RetryPlan;
use crate::transport::GATEWAY_API_KEY_HEADER;
use crate::transport::TransportError;
use crate::transport::api_key_headers;
use crate::transport::post_json;
use crate::transport::post_json_async;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Forwarding client for one resolved gateway connection.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    /// Resolved connection settings.
    settings: GatewaySettings,
    /// Executable retry schedule derived from the settings.
    plan: RetryPlan,
}

impl GatewayClient {
    /// Creates a client over resolved settings.
    #[must_use]
    pub fn new(settings: GatewaySettings) -> Self {
        let plan = RetryPlan::from_policy(&settings.retry);
        Self {
            settings,
            plan,
        }
    }

    /// Resolves and builds the client a protected LLM call should use.
    ///
    /// The scope's active gateway selection, when present, takes precedence
    /// over the provider's default entry. Returns `None` when the LLM
    /// channel is not in gateway mode or no entry applies.
    ///
    /// # Errors
    ///
    /// The inner result propagates entry resolution failures.
    pub fn for_provider(
        state: &ConfigState,
        provider: &str,
        scope: Option<&InspectionScope>,
    ) -> Option<Result<Self, ConfigError>> {
        let active = scope.and_then(InspectionScope::active_gateway);
        resolve_for_provider(state, provider, active.as_deref())
            .map(|resolved| resolved.map(Self::new))
    }

    /// Returns the resolved settings this client forwards through.
    #[must_use]
    pub const fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Forwards a provider payload through the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::GatewayUnavailable`] when the gateway is
    /// unreachable and the connection fails closed, and
    /// [`InspectError::Remote`] or [`InspectError::Decode`] for permanent
    /// failures regardless of the fail-open flag.
    pub fn call(&self, payload: &Value) -> Result<Value, InspectError> {
        self.call_with_headers(payload, &[])
    }

    /// Forwards a provider payload with caller-supplied headers appended.
    ///
    /// The gateway `api-key` header wins over a caller header of the same
    /// name.
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub fn call_with_headers(
        &self,
        payload: &Value,
        extra: &[(String, String)],
    ) -> Result<Value, InspectError> {
        let headers = match self.headers(extra) {
            Ok(headers) => headers,
            Err(err) => return self.settle(Err(err)),
        };
        let outcome = post_json(
            &self.settings.url,
            headers,
            payload,
            self.settings.timeout(),
            &self.plan,
        );
        self.settle(outcome)
    }

    /// Async form of [`Self::call`].
    ///
    /// The exchange runs on a detached task; dropping this future does not
    /// abort the in-flight forward.
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn call_async(&self, payload: &Value) -> Result<Value, InspectError> {
        self.call_with_headers_async(payload, &[]).await
    }

    /// Async form of [`Self::call_with_headers`].
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn call_with_headers_async(
        &self,
        payload: &Value,
        extra: &[(String, String)],
    ) -> Result<Value, InspectError> {
        let headers = match self.headers(extra) {
            Ok(headers) => headers,
            Err(err) => return self.settle(Err(err)),
        };
        let url = self.settings.url.clone();
        let body = payload.clone();
        let timeout = self.settings.timeout();
        let plan = self.plan.clone();
        let handle = tokio::spawn(async move {
            post_json_async(&url, headers, &body, timeout, &plan).await
        });
        let outcome = handle.await.map_err(|err| InspectError::Network {
            message: err.to_string(),
            decision: Decision::block(vec!["gateway task failed".to_string()]),
        })?;
        self.settle(outcome)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Builds the forwarding headers for the configured auth mode, with
    /// caller headers underneath.
    fn headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                TransportError::Unavailable(format!("invalid header name: {name}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                TransportError::Unavailable(format!("invalid value for header {name}"))
            })?;
            headers.insert(name, value);
        }
        match (&self.settings.auth_mode, &self.settings.api_key) {
            (AuthMode::ApiKey, Some(api_key)) => {
                headers.extend(api_key_headers(GATEWAY_API_KEY_HEADER, api_key)?);
            }
            _ => {
                headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
        }
        Ok(headers)
    }

    /// Applies the fail-open policy to the transport outcome.
    fn settle(&self, outcome: Result<Value, TransportError>) -> Result<Value, InspectError> {
        match outcome {
            Ok(body) => Ok(body),
            Err(err) if err.fail_open_eligible() && self.settings.fail_open => {
                warn!(
                    url = %self.settings.url,
                    error = err.message(),
                    "gateway unavailable, failing open"
                );
                Ok(json!({ "error": err.message(), "fail_open": true }))
            }
            Err(err) if err.fail_open_eligible() => Err(InspectError::GatewayUnavailable {
                message: err.message().to_string(),
                decision: Decision::block(vec!["security gateway unavailable".to_string()]),
            }),
            Err(err) => {
                let decision = Decision::block(vec!["security gateway unavailable".to_string()]);
                Err(err.into_inspect_error(decision))
            }
        }
    }
}
