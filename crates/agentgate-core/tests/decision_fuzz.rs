// crates/agentgate-core/tests/decision_fuzz.rs
// ============================================================================
// Module: Decision Property Tests
// Description: Property tests for verdict invariants.
// ============================================================================
//! ## Overview
//! Checks that the allow boundary and equality semantics hold for arbitrary
//! reason lists and raw payloads.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use agentgate_core::Decision;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn prop_block_never_allows(reasons in proptest::collection::vec(".{0,32}", 0..8)) {
        let decision = Decision::block(reasons);
        prop_assert!(!decision.allows());
    }

    #[test]
    fn prop_non_block_always_allows(reasons in proptest::collection::vec(".{0,32}", 0..8)) {
        prop_assert!(Decision::allow_with_reasons(reasons.clone()).allows());
        prop_assert!(Decision::sanitize(reasons.clone(), None).allows());
        prop_assert!(Decision::monitor_only(reasons).allows());
    }

    #[test]
    fn prop_raw_response_never_affects_equality(
        reasons in proptest::collection::vec(".{0,32}", 0..8),
        payload in ".{0,64}",
    ) {
        let bare = Decision::block(reasons.clone());
        let annotated = Decision::block(reasons).with_raw_response(json!({"body": payload}));
        prop_assert_eq!(bare, annotated);
    }
}
