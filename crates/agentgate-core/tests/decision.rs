// crates/agentgate-core/tests/decision.rs
// ============================================================================
// Module: Decision Tests
// Description: Tests for the verdict value and its allow/block boundary.
// ============================================================================
//! ## Overview
//! Validates the `allows` invariant, equality semantics, and action parsing.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use agentgate_core::Action;
use agentgate_core::Decision;
use serde_json::json;

// ============================================================================
// SECTION: Allow Boundary
// ============================================================================

#[test]
fn test_only_block_denies() {
    assert!(Decision::allow().allows());
    assert!(Decision::allow_with_reasons(vec!["tolerated timeout".to_string()]).allows());
    assert!(Decision::sanitize(vec!["pii".to_string()], Some("[redacted]".to_string())).allows());
    assert!(Decision::monitor_only(vec!["low severity".to_string()]).allows());
    assert!(!Decision::block(vec!["policy_violation".to_string()]).allows());
}

#[test]
fn test_block_with_empty_reasons_still_denies() {
    let decision = Decision::block(Vec::new());
    assert!(!decision.allows());
    assert!(decision.reasons().is_empty());
}

// ============================================================================
// SECTION: Equality
// ============================================================================

#[test]
fn test_equality_ignores_raw_response() {
    let bare = Decision::block(vec!["policy_violation".to_string()]);
    let annotated = Decision::block(vec!["policy_violation".to_string()])
        .with_raw_response(json!({"action": "block", "event_id": "abc"}));
    assert_eq!(bare, annotated);
    assert!(annotated.raw_response().is_some());
    assert!(bare.raw_response().is_none());
}

#[test]
fn test_equality_observes_sanitized_content() {
    let first = Decision::sanitize(vec!["pii".to_string()], Some("[redacted]".to_string()));
    let second = Decision::sanitize(vec!["pii".to_string()], None);
    assert_ne!(first, second);
}

// ============================================================================
// SECTION: Action Parsing
// ============================================================================

#[test]
fn test_action_labels_round_trip() {
    for action in [
        Action::Allow,
        Action::Block,
        Action::Sanitize,
        Action::MonitorOnly,
    ] {
        assert_eq!(Action::parse(action.as_str()), Some(action));
    }
}

#[test]
fn test_action_parse_is_case_insensitive() {
    assert_eq!(Action::parse("BLOCK"), Some(Action::Block));
    assert_eq!(Action::parse("Monitor_Only"), Some(Action::MonitorOnly));
}

#[test]
fn test_unknown_action_parses_to_none() {
    assert_eq!(Action::parse("quarantine"), None);
    assert_eq!(Action::parse(""), None);
}
