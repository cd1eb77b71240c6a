// crates/agentgate-core/src/wire/chat.rs
// ============================================================================
// Module: Chat Inspection Wire Model
// Description: Response model for the chat inspection endpoint.
// Purpose: Map chat inspection responses to decisions.
// Dependencies: serde, serde_json, crate::core::decision
// ============================================================================

//! ## Overview
//! The chat inspection endpoint answers `POST {messages, metadata, rules?}`
//! with `{action, reasons?, sanitized_content?, rules?, severity?}`. The
//! `action` label is matched case-insensitively; labels outside the taxonomy
//! degrade to allow, mirroring the policy service contract where absence of a
//! verdict means no objection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::core::decision::Action;
use crate::core::decision::Decision;
use crate::error::InspectError;
use crate::wire::RuleMatch;
use crate::wire::reasons_from_rules;

// ============================================================================
// SECTION: Response Model
// ============================================================================

/// Response body of the chat inspection endpoint.
///
/// All fields are optional on the wire; defaults represent "no objection".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatInspectResponse {
    /// Verdict action label, matched case-insensitively.
    pub action: Option<String>,
    /// Explicit reason strings, when the service provides them.
    pub reasons: Vec<String>,
    /// Replacement content accompanying a sanitize action.
    pub sanitized_content: Option<String>,
    /// Rules that matched during inspection.
    pub rules: Vec<RuleMatch>,
    /// All rules the service processed; fallback reason source.
    pub processed_rules: Vec<RuleMatch>,
    /// Overall severity label, when assigned.
    pub severity: Option<String>,
}

// ============================================================================
// SECTION: Verdict Mapping
// ============================================================================

/// Parses a chat inspection response body into a [`Decision`].
///
/// When no explicit reasons are present, reasons are derived from `rules`,
/// then from `processed_rules`. The original body is attached to the decision
/// as its raw response.
///
/// # Errors
///
/// Returns [`InspectError::Decode`] when the body is not a chat inspection
/// response object. Decode failures are never retried.
pub fn decision_from_chat_response(body: Value) -> Result<Decision, InspectError> {
    let parsed: ChatInspectResponse = serde_json::from_value(body.clone())
        .map_err(|err| InspectError::Decode(err.to_string()))?;

    let action = parsed
        .action
        .as_deref()
        .and_then(Action::parse)
        .unwrap_or(Action::Allow);

    let mut reasons = parsed.reasons;
    if reasons.is_empty() {
        reasons = reasons_from_rules(&parsed.rules);
    }
    if reasons.is_empty() {
        reasons = reasons_from_rules(&parsed.processed_rules);
    }

    let decision = match action {
        Action::Block => Decision::block(reasons),
        Action::Sanitize => Decision::sanitize(reasons, parsed.sanitized_content),
        Action::MonitorOnly => Decision::monitor_only(reasons),
        Action::Allow => Decision::allow_with_reasons(reasons),
    };
    Ok(decision.with_raw_response(body))
}
