// crates/agentgate-core/src/wire/mod.rs
// ============================================================================
// Module: Wire Response Models
// Description: Tagged models for remote inspection responses.
// Purpose: Parse provider responses explicitly at the boundary.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Remote inspection responses are parsed once, at the wire boundary, into
//! tagged structs; nothing downstream inspects JSON shape ad hoc. Both
//! channels share the rule-match model and the reason-derivation rule: when a
//! response carries no explicit reason strings, reasons are derived from rule
//! matches whose classification is a real violation.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod chat;
pub mod mcp;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use chat::ChatInspectResponse;
pub use chat::decision_from_chat_response;
pub use mcp::McpInspectEnvelope;
pub use mcp::McpInspectResult;
pub use mcp::McpRpcError;
pub use mcp::McpWireMessage;
pub use mcp::RpcId;
pub use mcp::decision_from_mcp_response;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Shared Models
// ============================================================================

/// Classification label meaning "no violation detected".
const NONE_VIOLATION: &str = "NONE_VIOLATION";
/// Severity label meaning "no severity assigned".
const NONE_SEVERITY: &str = "NONE_SEVERITY";

/// One rule evaluated by the remote policy service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleMatch {
    /// Name of the evaluated rule.
    pub rule_name: Option<String>,
    /// Classification assigned by the rule, when any.
    pub classification: Option<String>,
    /// Numeric rule identifier, when the service assigns one.
    pub rule_id: Option<i64>,
    /// Entity types the rule matched against.
    pub entity_types: Vec<String>,
}

/// Derives reason strings from rule matches with real violations.
///
/// Matches classified as "none" are skipped; the rest render as
/// `rule_name: classification`.
#[must_use]
pub(crate) fn reasons_from_rules(rules: &[RuleMatch]) -> Vec<String> {
    let mut reasons = Vec::new();
    for rule in rules {
        let Some(classification) = rule.classification.as_deref() else {
            continue;
        };
        if classification == NONE_VIOLATION || classification == NONE_SEVERITY {
            continue;
        }
        let name = rule.rule_name.as_deref().unwrap_or("unnamed rule");
        reasons.push(format!("{name}: {classification}"));
    }
    reasons
}
