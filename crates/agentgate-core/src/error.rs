// crates/agentgate-core/src/error.rs
// ============================================================================
// Module: Error Taxonomy
// Description: Configuration and inspection error types.
// Purpose: Provide the typed failure surface for configuration and clients.
// Dependencies: thiserror, crate::core::decision
// ============================================================================

//! ## Overview
//! Configuration errors are fatal, never retried, and surfaced at init time
//! with the offending field named. Inspection errors separate transient
//! classes (timeout, network, retryable status) from permanent ones
//! (decoding, non-retryable remote status, policy block); the variants raised
//! at the enforcement boundary carry the triggering [`Decision`] so hosts can
//! log or act on the verdict that stopped the call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::decision::Decision;

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Configuration failures surfaced at init time.
///
/// # Invariants
/// - Never retried and never silently recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field holds a value outside its enumerated taxonomy.
    #[error("invalid value `{value}` for `{field}`")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// The rejected value.
        value: String,
    },
    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(String),
    /// The configuration file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(String),
    /// The configuration file exceeds the size limit.
    #[error("config file too large: {0} bytes")]
    FileTooLarge(u64),
    /// The configuration file is not valid TOML or not a table.
    #[error("invalid config file: {0}")]
    ParseFailed(String),
    /// A `${VAR}` substitution referenced an unset environment variable.
    #[error("environment variable `{0}` is not set")]
    MissingEnvVar(String),
}

// ============================================================================
// SECTION: Inspection Errors
// ============================================================================

/// Inspection and gateway client failures.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The remote call exceeded its timeout on every attempt.
    #[error("inspection timed out: {message}")]
    Timeout {
        /// Description of the final timeout.
        message: String,
        /// Block verdict enforced when failing closed.
        decision: Decision,
    },
    /// The remote endpoint was unreachable on every attempt.
    #[error("inspection network error: {message}")]
    Network {
        /// Description of the final connection failure.
        message: String,
        /// Block verdict enforced when failing closed.
        decision: Decision,
    },
    /// The remote response body could not be decoded. Never retried.
    #[error("inspection response decode error: {0}")]
    Decode(String),
    /// A non-2xx status outside the retry set. Never retried.
    #[error("inspection remote error: status {status}")]
    Remote {
        /// HTTP status returned by the remote endpoint.
        status: u16,
        /// Response body excerpt, when available.
        message: String,
    },
    /// The security gateway was unavailable and the caller fails closed.
    #[error("gateway unavailable: {message}")]
    GatewayUnavailable {
        /// Description of the final gateway failure.
        message: String,
        /// Block verdict enforced when failing closed.
        decision: Decision,
    },
    /// A policy verdict blocked the call at the enforcement boundary.
    #[error("security policy violation: {message}")]
    PolicyBlocked {
        /// Human-readable summary built from the verdict reasons.
        message: String,
        /// The verdict that blocked the call.
        decision: Decision,
    },
}

impl InspectError {
    /// Returns the verdict carried by enforcement-boundary variants.
    #[must_use]
    pub const fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Timeout { decision, .. }
            | Self::Network { decision, .. }
            | Self::GatewayUnavailable { decision, .. }
            | Self::PolicyBlocked { decision, .. } => Some(decision),
            Self::Decode(_) | Self::Remote { .. } => None,
        }
    }

    /// Builds the enforcement error for a blocking verdict.
    ///
    /// The message joins the verdict reasons, matching what hosts log when a
    /// call is stopped in enforce mode.
    #[must_use]
    pub fn policy_blocked(decision: Decision) -> Self {
        let message = if decision.reasons().is_empty() {
            "request blocked".to_string()
        } else {
            decision.reasons().join("; ")
        };
        Self::PolicyBlocked {
            message,
            decision,
        }
    }
}
