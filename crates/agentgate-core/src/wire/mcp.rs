// crates/agentgate-core/src/wire/mcp.rs
// ============================================================================
// Module: MCP Inspection Wire Model
// Description: JSON-RPC 2.0 envelopes for the MCP inspection endpoint.
// Purpose: Build outbound envelopes and map inspection responses to decisions.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! MCP inspection speaks JSON-RPC 2.0: the client posts the tool/prompt/
//! resource exchange as an envelope (`method` + `params` for the request
//! half, plus `result` for the response half) and receives an envelope whose
//! `result` carries the verdict. `is_safe == false` blocks independently of
//! the `action` label: either negative signal is sufficient.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::decision::Action;
use crate::core::decision::Decision;
use crate::core::message::McpMethod;
use crate::error::InspectError;
use crate::wire::RuleMatch;
use crate::wire::reasons_from_rules;

// ============================================================================
// SECTION: JSON-RPC Primitives
// ============================================================================

/// JSON-RPC correlation id; string or number per JSON-RPC 2.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    /// Numeric id.
    Number(u64),
    /// String id.
    Text(String),
}

/// JSON-RPC error object returned for failed inspections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct McpRpcError {
    /// JSON-RPC error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional error context.
    #[serde(default)]
    pub data: Option<Value>,
}

// ============================================================================
// SECTION: Outbound Envelope
// ============================================================================

/// Outbound JSON-RPC 2.0 envelope posted to the MCP inspection endpoint.
///
/// # Invariants
/// - `jsonrpc` is always the literal `"2.0"`.
/// - Request-half envelopes carry `params`; response-half envelopes also
///   carry `result`.
#[derive(Debug, Clone, Serialize)]
pub struct McpWireMessage {
    /// JSON-RPC version literal.
    pub jsonrpc: &'static str,
    /// JSON-RPC method under inspection.
    pub method: &'static str,
    /// Parameters of the inspected call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Result of the inspected call, for the response half.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Correlation id.
    pub id: RpcId,
}

impl McpWireMessage {
    /// Builds the envelope for inspecting the request half of a call.
    #[must_use]
    pub const fn request(method: McpMethod, params: Value, id: RpcId) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.as_str(),
            params: Some(params),
            result: None,
            id,
        }
    }

    /// Builds the envelope for inspecting the response half of a call.
    #[must_use]
    pub const fn response(method: McpMethod, params: Value, result: Value, id: RpcId) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.as_str(),
            params: Some(params),
            result: Some(result),
            id,
        }
    }
}

// ============================================================================
// SECTION: Inbound Envelope
// ============================================================================

/// Verdict payload inside a successful inspection response.
#[derive(Debug, Clone, Deserialize)]
pub struct McpInspectResult {
    /// Whether the inspected content is considered safe.
    pub is_safe: bool,
    /// Verdict action label, matched case-insensitively.
    #[serde(default)]
    pub action: Option<String>,
    /// Violation classifications detected.
    #[serde(default)]
    pub classifications: Vec<String>,
    /// Severity label, when assigned.
    #[serde(default)]
    pub severity: Option<String>,
    /// Human-readable explanation of the verdict.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Rules that matched during inspection.
    #[serde(default)]
    pub rules: Vec<RuleMatch>,
    /// Backend event id for correlation.
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Inbound JSON-RPC 2.0 envelope from the MCP inspection endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct McpInspectEnvelope {
    /// JSON-RPC version echoed by the service.
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Verdict payload for successful inspections.
    #[serde(default)]
    pub result: Option<McpInspectResult>,
    /// Error object for failed inspections.
    #[serde(default)]
    pub error: Option<McpRpcError>,
    /// Correlation id echoed from the inspected message.
    #[serde(default)]
    pub id: Option<RpcId>,
}

// ============================================================================
// SECTION: Verdict Mapping
// ============================================================================

/// Parses an MCP inspection response body into a [`Decision`].
///
/// A JSON-RPC `error` maps to block. Within a `result`, `is_safe == false`
/// and `action == block` are independent block triggers. Reasons are taken
/// from classifications and the explanation, falling back to rule matches.
/// A response with neither `result` nor `error` maps to allow.
///
/// # Errors
///
/// Returns [`InspectError::Decode`] when the body is not a JSON-RPC
/// inspection envelope. Decode failures are never retried.
pub fn decision_from_mcp_response(body: Value) -> Result<Decision, InspectError> {
    let envelope: McpInspectEnvelope = serde_json::from_value(body.clone())
        .map_err(|err| InspectError::Decode(err.to_string()))?;

    if let Some(error) = envelope.error {
        let reason = format!("mcp inspection error: {}", error.message);
        return Ok(Decision::block(vec![reason]).with_raw_response(body));
    }

    let Some(result) = envelope.result else {
        return Ok(Decision::allow().with_raw_response(body));
    };

    let mut reasons = result.classifications.clone();
    if let Some(explanation) = &result.explanation
        && !reasons.iter().any(|reason| reason == explanation)
    {
        reasons.push(explanation.clone());
    }
    if reasons.is_empty() {
        reasons = reasons_from_rules(&result.rules);
    }

    let action_blocks =
        result.action.as_deref().and_then(Action::parse) == Some(Action::Block);
    let decision = if action_blocks || !result.is_safe {
        Decision::block(reasons)
    } else {
        Decision::allow_with_reasons(reasons)
    };
    Ok(decision.with_raw_response(body))
}
