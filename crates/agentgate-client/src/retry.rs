// crates/agentgate-client/src/retry.rs
// ============================================================================
// Module: Retry Plan
// Description: Attempt budgeting and exponential backoff arithmetic.
// Purpose: Turn a retry policy into concrete attempt counts and delays.
// Dependencies: agentgate-core
// ============================================================================

//! ## Overview
//! A [`RetryPlan`] is the executable form of a [`RetryPolicy`]: the attempt
//! total clamped to at least one, the retryable status set, and the backoff
//! schedule. Backoff is `factor * 2^retry_index` seconds capped at thirty
//! seconds; a factor of zero disables inter-attempt delay entirely. Only
//! timeouts, connection failures, and statuses in the retry set are
//! retryable; a body that fails to decode never is.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::time::Duration;

use agentgate_core::RetryPolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound on a single backoff delay, in seconds.
const MAX_BACKOFF_SECS: f64 = 30.0;

// ============================================================================
// SECTION: Retry Plan
// ============================================================================

/// Executable retry schedule derived from a [`RetryPolicy`].
///
/// # Invariants
/// - `total` is at least one; a policy declaring zero attempts still makes
///   the initial call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPlan {
    /// Total attempts, clamped to at least one.
    total: u32,
    /// Exponential backoff factor in seconds.
    backoff_factor: f64,
    /// HTTP status codes that trigger another attempt.
    status_codes: BTreeSet<u16>,
}

impl RetryPlan {
    /// Builds the plan for a policy, clamping the attempt total to one.
    #[must_use]
    pub fn from_policy(policy: &RetryPolicy) -> Self {
        Self {
            total: policy.total.max(1),
            backoff_factor: policy.backoff_factor,
            status_codes: policy.status_codes.clone(),
        }
    }

    /// Total attempts, including the initial call.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Whether an HTTP status triggers another attempt.
    #[must_use]
    pub fn retries_status(&self, status: u16) -> bool {
        self.status_codes.contains(&status)
    }

    /// Delay before the retry with the given zero-based index.
    #[must_use]
    pub fn backoff_delay(&self, retry_index: u32) -> Duration {
        if self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = f64::from(retry_index.min(32));
        let seconds = (self.backoff_factor * exponent.exp2()).min(MAX_BACKOFF_SECS);
        Duration::from_secs_f64(seconds)
    }
}

impl Default for RetryPlan {
    fn default() -> Self {
        Self::from_policy(&RetryPolicy::gateway_default())
    }
}
