// crates/agentgate-config/src/resolver.rs
// ============================================================================
// Module: Gateway Settings Resolver
// Description: Layered merge from gateway entries to resolved settings.
// Purpose: Produce the GatewaySettings consumed by gateway callers.
// Dependencies: agentgate-core, crate::{options, state}
// ============================================================================

//! ## Overview
//! Resolution merges three layers, nearest first: the entry's own overrides,
//! the channel's category defaults, and the hard fallbacks compiled into the
//! connection types. An entry only contributes fields it actually declares;
//! everything else falls through. The one cross-entry rule is auth-mode
//! inheritance: an LLM entry without an `auth_mode` borrows it from its
//! provider's default entry before falling back to `api_key`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use agentgate_core::AuthMode;
use agentgate_core::ConfigError;
use agentgate_core::GatewaySettings;

use crate::options::GatewayEntry;
use crate::state::ConfigState;
use crate::state::IntegrationMode;
use crate::state::ResolvedDefaults;
use crate::state::overlay_retry;

// ============================================================================
// SECTION: Entry Resolution
// ============================================================================

/// Resolves an LLM gateway entry into settings.
///
/// `provider` drives auth-mode inheritance: when the entry declares no
/// `auth_mode` and the provider has a default entry that does, that mode is
/// inherited.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when the entry has no `gateway_url`.
/// Auth-mode labels were validated at init time and cannot fail here.
pub fn resolve_llm_settings(
    state: &ConfigState,
    entry: &GatewayEntry,
    provider: Option<&str>,
) -> Result<GatewaySettings, ConfigError> {
    let inherited = match (&entry.auth_mode, provider) {
        (None, Some(provider)) => state
            .default_gateway(provider)
            .and_then(|default_entry| default_entry.auth_mode.clone()),
        _ => None,
    };
    resolve_entry(entry, inherited, state.gateway_llm_defaults())
}

/// Resolves an MCP gateway entry into settings.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when the entry has no `gateway_url`.
pub fn resolve_mcp_settings(
    state: &ConfigState,
    entry: &GatewayEntry,
) -> Result<GatewaySettings, ConfigError> {
    resolve_entry(entry, None, state.gateway_mcp_defaults())
}

/// Merges one entry over channel defaults into resolved settings.
fn resolve_entry(
    entry: &GatewayEntry,
    inherited_auth: Option<String>,
    defaults: &ResolvedDefaults,
) -> Result<GatewaySettings, ConfigError> {
    let url = entry
        .gateway_url
        .clone()
        .ok_or_else(|| ConfigError::MissingField("gateway_url".to_string()))?;
    let auth_mode = match entry.auth_mode.as_deref().or(inherited_auth.as_deref()) {
        Some(label) => AuthMode::parse(label)?,
        None => AuthMode::ApiKey,
    };
    Ok(GatewaySettings {
        url,
        api_key: entry.gateway_api_key.clone(),
        auth_mode,
        fail_open: entry.fail_open.unwrap_or(defaults.fail_open),
        timeout_secs: entry.timeout.unwrap_or(defaults.timeout_secs),
        retry: overlay_retry(&defaults.retry, entry.retry.as_ref()),
    })
}

// ============================================================================
// SECTION: Provider Resolution
// ============================================================================

/// Resolves the gateway settings a protected LLM call should use.
///
/// Returns `None` when the LLM channel is not in gateway mode or no entry
/// applies. The scope's active gateway, when set, takes precedence over the
/// provider's default entry, but only if that entry is usable for the
/// provider; an entry pinned to a different provider falls through to the
/// default lookup.
///
/// # Errors
///
/// The inner result propagates entry resolution failures.
pub fn resolve_for_provider(
    state: &ConfigState,
    provider: &str,
    active_gateway: Option<&str>,
) -> Option<Result<GatewaySettings, ConfigError>> {
    if state.llm_integration_mode() != IntegrationMode::Gateway {
        return None;
    }

    if let Some(name) = active_gateway
        && let Some(entry) = state.llm_gateway(name)
        && entry
            .provider
            .as_deref()
            .is_none_or(|entry_provider| entry_provider == provider)
    {
        return Some(resolve_llm_settings(state, entry, Some(provider)));
    }

    let entry = state.default_gateway(provider)?;
    Some(resolve_llm_settings(state, entry, Some(provider)))
}
