// crates/agentgate-client/src/mcp.rs
// ============================================================================
// Module: MCP Inspector
// Description: JSON-RPC inspection client for the MCP channel.
// Purpose: Classify tool, prompt, and resource exchanges before use.
// Dependencies: serde_json, tokio, tracing, agentgate-core, agentgate-config
// ============================================================================

//! ## Overview
//! The MCP inspector wraps the inspected exchange in a JSON-RPC 2.0 envelope
//! and posts it to the MCP inspection endpoint. Request halves carry the
//! method and params; response halves additionally carry the result.
//! Correlation ids come from a process-unique atomic counter so concurrent
//! inspections never share an id. Endpoint, key, and connection behavior
//! fall back to the LLM channel's configuration layer by layer, matching how
//! deployments typically point both channels at one service.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Value;
use tracing::debug;
use tracing::warn;

use agentgate_config::ConfigState;
use agentgate_config::InspectionMode;
use agentgate_core::Channel;
use agentgate_core::ConfigError;
use agentgate_core::ContextUpdate;
use agentgate_core::Decision;
use agentgate_core::InspectError;
use agentgate_core::InspectionScope;
use agentgate_core::McpMethod;
use agentgate_core::decision_from_mcp_response;
use agentgate_core::wire::McpWireMessage;
use agentgate_core::wire::RpcId;

use crate::inspector::ChannelProfile;
use crate::inspector::InspectorOverrides;
use crate::inspector::settle_failure;
use crate::transport::INSPECTION_API_KEY_HEADER;
use crate::transport::MCP_INSPECT_PATH;
use crate::transport::TransportError;
use crate::transport::api_key_headers;
use crate::transport::post_json;
use crate::transport::post_json_async;

// ============================================================================
// SECTION: Inspector
// ============================================================================

/// JSON-RPC inspection client for the MCP channel.
///
/// Cheap to clone; clones share the id counter and the scope handle.
#[derive(Debug, Clone)]
pub struct McpInspector {
    /// Resolved connection profile.
    profile: ChannelProfile,
    /// Monotonic source of JSON-RPC correlation ids.
    next_id: Arc<AtomicU64>,
    /// Call-chain scope, when the host threads one through.
    scope: Option<InspectionScope>,
}

impl McpInspector {
    /// Builds an inspector over committed state plus explicit overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the resolved endpoint is
    /// not a valid URL.
    pub fn new(state: &ConfigState, overrides: InspectorOverrides) -> Result<Self, ConfigError> {
        Ok(Self {
            profile: ChannelProfile::mcp(state, &overrides)?,
            next_id: Arc::new(AtomicU64::new(0)),
            scope: None,
        })
    }

    /// Attaches the call-chain scope this inspector reports into.
    #[must_use]
    pub fn with_scope(mut self, scope: InspectionScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Inspects the request half of an MCP call.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::PolicyBlocked`] in enforce mode on a blocking
    /// verdict, and transport failures per the fail-open policy.
    pub fn inspect_request(
        &self,
        method: McpMethod,
        params: Value,
    ) -> Result<Decision, InspectError> {
        let envelope = McpWireMessage::request(method, params, self.next_rpc_id());
        self.inspect_envelope(&envelope, false)
    }

    /// Inspects the response half of an MCP call.
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_request`].
    pub fn inspect_response(
        &self,
        method: McpMethod,
        params: Value,
        result: Value,
    ) -> Result<Decision, InspectError> {
        let envelope = McpWireMessage::response(method, params, result, self.next_rpc_id());
        self.inspect_envelope(&envelope, true)
    }

    /// Async form of [`Self::inspect_request`].
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_request`].
    pub async fn inspect_request_async(
        &self,
        method: McpMethod,
        params: Value,
    ) -> Result<Decision, InspectError> {
        let envelope = McpWireMessage::request(method, params, self.next_rpc_id());
        self.inspect_envelope_async(envelope, false).await
    }

    /// Async form of [`Self::inspect_response`].
    ///
    /// The exchange runs on a detached task; dropping this future does not
    /// abort the in-flight inspection.
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_request`].
    pub async fn inspect_response_async(
        &self,
        method: McpMethod,
        params: Value,
        result: Value,
    ) -> Result<Decision, InspectError> {
        let envelope = McpWireMessage::response(method, params, result, self.next_rpc_id());
        self.inspect_envelope_async(envelope, true).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Issues the next process-unique correlation id.
    fn next_rpc_id(&self) -> RpcId {
        RpcId::Number(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Builds the outbound exchange, or `None` when no call should be made.
    fn prepare(
        &self,
        envelope: &McpWireMessage,
    ) -> Result<Option<(String, reqwest::header::HeaderMap, Value)>, TransportError> {
        if self.profile.mode == InspectionMode::Off {
            return Ok(None);
        }
        if self
            .scope
            .as_ref()
            .is_some_and(|scope| scope.is_skipped(Channel::Mcp))
        {
            return Ok(None);
        }
        let (Some(endpoint), Some(api_key)) = (&self.profile.endpoint, &self.profile.api_key)
        else {
            debug!("mcp inspection unconfigured, allowing");
            return Ok(None);
        };
        let payload = serde_json::to_value(envelope)
            .map_err(|err| TransportError::Decode(err.to_string()))?;
        let headers = api_key_headers(INSPECTION_API_KEY_HEADER, api_key)?;
        Ok(Some((format!("{endpoint}{MCP_INSPECT_PATH}"), headers, payload)))
    }

    /// Runs one blocking inspection exchange for an envelope.
    fn inspect_envelope(
        &self,
        envelope: &McpWireMessage,
        response_half: bool,
    ) -> Result<Decision, InspectError> {
        let (url, headers, payload) = match self.prepare(envelope) {
            Ok(Some(exchange)) => exchange,
            Ok(None) => return Ok(Decision::allow()),
            Err(err) => return self.settle(response_half, Err(err)),
        };
        let outcome = post_json(&url, headers, &payload, self.profile.timeout, &self.profile.plan);
        self.settle(response_half, outcome)
    }

    /// Runs one detached-task inspection exchange for an envelope.
    async fn inspect_envelope_async(
        &self,
        envelope: McpWireMessage,
        response_half: bool,
    ) -> Result<Decision, InspectError> {
        let (url, headers, payload) = match self.prepare(&envelope) {
            Ok(Some(exchange)) => exchange,
            Ok(None) => return Ok(Decision::allow()),
            Err(err) => return self.settle(response_half, Err(err)),
        };
        let timeout = self.profile.timeout;
        let plan = self.profile.plan.clone();
        let handle = tokio::spawn(async move {
            post_json_async(&url, headers, &payload, timeout, &plan).await
        });
        let outcome = handle.await.map_err(|err| InspectError::Network {
            message: err.to_string(),
            decision: Decision::block(vec!["inspection task failed".to_string()]),
        })?;
        self.settle(response_half, outcome)
    }

    /// Maps the transport outcome to a verdict and applies the mode.
    fn settle(
        &self,
        response_half: bool,
        outcome: Result<Value, TransportError>,
    ) -> Result<Decision, InspectError> {
        let decision = match outcome {
            Ok(body) => decision_from_mcp_response(body)?,
            Err(err) => settle_failure(self.profile.fail_open, err)?,
        };

        if let Some(scope) = &self.scope {
            scope.set(ContextUpdate {
                metadata: None,
                decision: Some(decision.clone()),
                done: response_half.then_some(true),
            });
        }

        if !decision.allows() {
            if self.profile.mode == InspectionMode::Enforce {
                return Err(InspectError::policy_blocked(decision));
            }
            warn!(reasons = ?decision.reasons(), "mcp inspection verdict blocks the call");
        }
        Ok(decision)
    }
}
