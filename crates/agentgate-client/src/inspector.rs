// crates/agentgate-client/src/inspector.rs
// ============================================================================
// Module: Inspector Plumbing
// Description: Shared configuration resolution and failure settlement.
// Purpose: Give both inspection channels one precedence and fail-open path.
// Dependencies: serde_json, tracing, agentgate-core, agentgate-config
// ============================================================================

//! ## Overview
//! Both inspectors resolve their connection the same way: an explicit
//! override wins, then committed state, then the environment layer, then the
//! compiled-in behavior. The resolved form is a [`ChannelProfile`]. Failure
//! settlement is also shared: a fail-open channel converts eligible
//! transport failures into an annotated allow verdict, a fail-closed channel
//! raises with a block verdict attached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde_json::json;
use tracing::warn;

use agentgate_config::ConfigState;
use agentgate_config::InspectionMode;
use agentgate_config::ResolvedDefaults;
use agentgate_config::env;
use agentgate_core::ConfigError;
use agentgate_core::Decision;
use agentgate_core::InspectError;
use agentgate_core::RetryPolicy;

use crate::retry::RetryPlan;
use crate::transport::TransportError;
use crate::transport::normalize_endpoint;

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Explicit per-inspector overrides; the strongest precedence layer.
#[derive(Debug, Clone, Default)]
pub struct InspectorOverrides {
    /// Inspection endpoint URL.
    pub endpoint: Option<String>,
    /// Inspection API key.
    pub api_key: Option<String>,
    /// Inspection mode for the channel.
    pub mode: Option<InspectionMode>,
    /// Allow the protected call to proceed on client failure.
    pub fail_open: Option<bool>,
    /// Call timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Retry behavior.
    pub retry: Option<RetryPolicy>,
}

// ============================================================================
// SECTION: Channel Profile
// ============================================================================

/// Fully resolved connection profile for one inspection channel.
#[derive(Debug, Clone)]
pub(crate) struct ChannelProfile {
    /// Normalized service base URL, when configured.
    pub endpoint: Option<String>,
    /// API key, when configured.
    pub api_key: Option<String>,
    /// Inspection mode after precedence.
    pub mode: InspectionMode,
    /// Fail-open flag after precedence.
    pub fail_open: bool,
    /// Call timeout after precedence.
    pub timeout: Duration,
    /// Executable retry schedule after precedence.
    pub plan: RetryPlan,
}

impl ChannelProfile {
    /// Resolves the LLM channel profile.
    pub(crate) fn llm(
        state: &ConfigState,
        overrides: &InspectorOverrides,
    ) -> Result<Self, ConfigError> {
        let endpoint = overrides
            .endpoint
            .clone()
            .or_else(|| state.api_llm_endpoint().map(str::to_string))
            .or_else(env::llm_endpoint);
        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| state.api_llm_key().map(str::to_string))
            .or_else(env::llm_api_key);
        Self::build(endpoint, api_key, state.api_llm_mode(), state.api_llm_defaults(), overrides)
    }

    /// Resolves the MCP channel profile, with LLM fallbacks per layer.
    pub(crate) fn mcp(
        state: &ConfigState,
        overrides: &InspectorOverrides,
    ) -> Result<Self, ConfigError> {
        let endpoint = overrides
            .endpoint
            .clone()
            .or_else(|| state.api_mcp_endpoint().map(str::to_string))
            .or_else(env::mcp_endpoint);
        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| state.api_mcp_key().map(str::to_string))
            .or_else(env::mcp_api_key);
        Self::build(endpoint, api_key, state.api_mcp_mode(), state.api_mcp_defaults(), overrides)
    }

    /// Applies overrides and defaults to the layered lookups.
    fn build(
        endpoint: Option<String>,
        api_key: Option<String>,
        state_mode: InspectionMode,
        defaults: &ResolvedDefaults,
        overrides: &InspectorOverrides,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoint
            .as_deref()
            .map(normalize_endpoint)
            .transpose()?;
        let retry = overrides.retry.clone().unwrap_or_else(|| defaults.retry.clone());
        Ok(Self {
            endpoint,
            api_key,
            mode: overrides.mode.unwrap_or(state_mode),
            fail_open: overrides.fail_open.unwrap_or(defaults.fail_open),
            timeout: Duration::from_secs(
                overrides.timeout_secs.unwrap_or(defaults.timeout_secs),
            ),
            plan: RetryPlan::from_policy(&retry),
        })
    }

    /// Whether the channel can actually reach a service.
    #[allow(dead_code, reason = "mirrors the reference API; not yet called internally")]
    pub(crate) const fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some()
    }
}

// ============================================================================
// SECTION: Failure Settlement
// ============================================================================

/// Converts a transport failure per the channel's fail-open policy.
///
/// Fail-open channels swallow eligible failures into an allow verdict whose
/// raw response records the error and the `fail_open` annotation. Everything
/// else raises, with a block verdict attached to the eligible variants.
pub(crate) fn settle_failure(
    fail_open: bool,
    err: TransportError,
) -> Result<Decision, InspectError> {
    if err.fail_open_eligible() && fail_open {
        warn!(error = err.message(), "inspection unavailable, failing open");
        let raw = json!({ "error": err.message(), "fail_open": true });
        return Ok(Decision::allow().with_raw_response(raw));
    }
    let decision = Decision::block(vec!["inspection service unavailable".to_string()]);
    Err(err.into_inspect_error(decision))
}
