// crates/agentgate-core/tests/wire.rs
// ============================================================================
// Module: Wire Mapping Tests
// Description: Tests for chat and MCP response-to-decision mapping.
// ============================================================================
//! ## Overview
//! Validates verdict mapping for both inspection channels, including reason
//! derivation from rule matches and the independent block triggers of the
//! MCP envelope.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use agentgate_core::Action;
use agentgate_core::InspectError;
use agentgate_core::decision_from_chat_response;
use agentgate_core::decision_from_mcp_response;
use serde_json::json;

// ============================================================================
// SECTION: Chat Mapping
// ============================================================================

#[test]
fn test_chat_block_with_explicit_reasons() {
    let decision = decision_from_chat_response(json!({
        "action": "block",
        "reasons": ["policy_violation"],
    }))
    .unwrap();
    assert!(!decision.allows());
    assert_eq!(decision.reasons(), ["policy_violation"]);
    assert!(decision.raw_response().is_some());
}

#[test]
fn test_chat_action_is_case_insensitive() {
    let decision = decision_from_chat_response(json!({"action": "BLOCK"})).unwrap();
    assert!(!decision.allows());
}

#[test]
fn test_chat_unknown_action_degrades_to_allow() {
    let decision = decision_from_chat_response(json!({"action": "quarantine"})).unwrap();
    assert!(decision.allows());
    assert_eq!(decision.action(), Action::Allow);
}

#[test]
fn test_chat_missing_action_allows() {
    let decision = decision_from_chat_response(json!({})).unwrap();
    assert!(decision.allows());
}

#[test]
fn test_chat_reasons_fall_back_to_rules() {
    let decision = decision_from_chat_response(json!({
        "action": "block",
        "rules": [
            {"rule_name": "PII", "classification": "SECURITY_VIOLATION"},
            {"rule_name": "Benign", "classification": "NONE_VIOLATION"},
        ],
    }))
    .unwrap();
    assert_eq!(decision.reasons(), ["PII: SECURITY_VIOLATION"]);
}

#[test]
fn test_chat_reasons_fall_back_to_processed_rules() {
    let decision = decision_from_chat_response(json!({
        "action": "block",
        "rules": [],
        "processed_rules": [
            {"classification": "PRIVACY_VIOLATION"},
        ],
    }))
    .unwrap();
    assert_eq!(decision.reasons(), ["unnamed rule: PRIVACY_VIOLATION"]);
}

#[test]
fn test_chat_sanitize_carries_replacement_content() {
    let decision = decision_from_chat_response(json!({
        "action": "sanitize",
        "reasons": ["pii"],
        "sanitized_content": "My SSN is [redacted]",
    }))
    .unwrap();
    assert!(decision.allows());
    assert_eq!(decision.sanitized_content(), Some("My SSN is [redacted]"));
}

#[test]
fn test_chat_malformed_body_is_a_decode_error() {
    let err = decision_from_chat_response(json!(["not", "an", "object"])).unwrap_err();
    assert!(matches!(err, InspectError::Decode(_)));
}

// ============================================================================
// SECTION: MCP Mapping
// ============================================================================

#[test]
fn test_mcp_unsafe_blocks_even_when_action_allows() {
    let decision = decision_from_mcp_response(json!({
        "jsonrpc": "2.0",
        "result": {"is_safe": false, "action": "allow", "classifications": ["PROMPT_INJECTION"]},
        "id": 1,
    }))
    .unwrap();
    assert!(!decision.allows());
    assert_eq!(decision.reasons(), ["PROMPT_INJECTION"]);
}

#[test]
fn test_mcp_block_action_blocks_even_when_safe() {
    let decision = decision_from_mcp_response(json!({
        "jsonrpc": "2.0",
        "result": {"is_safe": true, "action": "block"},
        "id": 1,
    }))
    .unwrap();
    assert!(!decision.allows());
}

#[test]
fn test_mcp_safe_result_allows() {
    let decision = decision_from_mcp_response(json!({
        "jsonrpc": "2.0",
        "result": {"is_safe": true},
        "id": 7,
    }))
    .unwrap();
    assert!(decision.allows());
}

#[test]
fn test_mcp_rpc_error_blocks() {
    let decision = decision_from_mcp_response(json!({
        "jsonrpc": "2.0",
        "error": {"code": -32000, "message": "inspection backend down"},
        "id": 1,
    }))
    .unwrap();
    assert!(!decision.allows());
    assert_eq!(
        decision.reasons(),
        ["mcp inspection error: inspection backend down"]
    );
}

#[test]
fn test_mcp_empty_envelope_allows() {
    let decision = decision_from_mcp_response(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
    assert!(decision.allows());
}

#[test]
fn test_mcp_explanation_joins_classifications_without_duplicates() {
    let decision = decision_from_mcp_response(json!({
        "jsonrpc": "2.0",
        "result": {
            "is_safe": false,
            "classifications": ["SECURITY_VIOLATION"],
            "explanation": "SECURITY_VIOLATION",
        },
        "id": 1,
    }))
    .unwrap();
    assert_eq!(decision.reasons(), ["SECURITY_VIOLATION"]);
}

#[test]
fn test_mcp_reasons_fall_back_to_rules() {
    let decision = decision_from_mcp_response(json!({
        "jsonrpc": "2.0",
        "result": {
            "is_safe": false,
            "rules": [{"rule_name": "Secrets", "classification": "SECURITY_VIOLATION"}],
        },
        "id": 1,
    }))
    .unwrap();
    assert_eq!(decision.reasons(), ["Secrets: SECURITY_VIOLATION"]);
}

#[test]
fn test_mcp_malformed_body_is_a_decode_error() {
    let err = decision_from_mcp_response(json!("not an envelope")).unwrap_err();
    assert!(matches!(err, InspectError::Decode(_)));
}
