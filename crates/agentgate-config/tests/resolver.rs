// crates/agentgate-config/tests/resolver.rs
// ============================================================================
// Module: Settings Resolver Tests
// Description: Tests for the layered merge into resolved gateway settings.
// ============================================================================
//! ## Overview
//! Validates the entry-over-defaults-over-fallbacks merge, auth-mode
//! inheritance from provider defaults, and per-provider resolution with an
//! active gateway selection.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(
    clippy::field_reassign_with_default,
    reason = "Tests build option sets field by field for readability."
)]

use agentgate_config::ChannelDefaults;
use agentgate_config::ConfigState;
use agentgate_config::GatewayEntry;
use agentgate_config::InitOptions;
use agentgate_config::resolve_for_provider;
use agentgate_config::resolve_llm_settings;
use agentgate_config::resolve_mcp_settings;
use agentgate_core::AuthMode;
use agentgate_core::ConfigError;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Commits an option set into fresh state.
fn gateway_state(options: InitOptions) -> ConfigState {
    let mut state = ConfigState::new();
    state.init(options).unwrap();
    state
}

// ============================================================================
// SECTION: Layered Merge
// ============================================================================

#[test]
fn test_entry_overrides_category_defaults() {
    let mut options = InitOptions::default();
    options.gateway_mode.llm_defaults = Some(ChannelDefaults {
        fail_open: Some(true),
        timeout: Some(1),
        retry: None,
    });
    options.gateway_mode.llm_gateways.register(
        "primary",
        GatewayEntry {
            gateway_url: Some("https://gw.example.com".to_string()),
            timeout: Some(99),
            ..GatewayEntry::default()
        },
    );
    let state = gateway_state(options);

    let entry = state.llm_gateway("primary").unwrap();
    let settings = resolve_llm_settings(&state, entry, None).unwrap();
    assert_eq!(settings.url, "https://gw.example.com");
    assert!(settings.fail_open);
    assert_eq!(settings.timeout_secs, 99);
}

#[test]
fn test_undeclared_fields_use_hard_fallbacks() {
    let mut options = InitOptions::default();
    options.gateway_mode.llm_gateways.register(
        "bare",
        GatewayEntry {
            gateway_url: Some("https://gw.example.com".to_string()),
            ..GatewayEntry::default()
        },
    );
    let state = gateway_state(options);

    let settings =
        resolve_llm_settings(&state, state.llm_gateway("bare").unwrap(), None).unwrap();
    assert!(settings.fail_open);
    assert_eq!(settings.timeout_secs, 60);
    assert_eq!(settings.retry.total, 3);
    assert_eq!(settings.auth_mode, AuthMode::ApiKey);
}

#[test]
fn test_retry_overrides_merge_per_field() {
    let mut options = InitOptions::default();
    options.gateway_mode.llm_gateways.register(
        "tuned",
        GatewayEntry {
            gateway_url: Some("https://gw.example.com".to_string()),
            retry: Some(agentgate_config::RetryOptions {
                total: Some(5),
                backoff_factor: None,
                status_codes: None,
            }),
            ..GatewayEntry::default()
        },
    );
    let state = gateway_state(options);

    let settings =
        resolve_llm_settings(&state, state.llm_gateway("tuned").unwrap(), None).unwrap();
    assert_eq!(settings.retry.total, 5);
    assert!((settings.retry.backoff_factor - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_entry_without_url_never_resolves() {
    let state = gateway_state(InitOptions::default());
    let entry = GatewayEntry::default();
    let err = resolve_llm_settings(&state, &entry, None).unwrap_err();
    assert_eq!(err, ConfigError::MissingField("gateway_url".to_string()));
}

#[test]
fn test_mcp_entries_merge_against_mcp_defaults() {
    let mut options = InitOptions::default();
    options.gateway_mode.mcp_defaults = Some(ChannelDefaults {
        fail_open: Some(false),
        timeout: Some(15),
        retry: None,
    });
    options.gateway_mode.mcp_gateways.register(
        "tools",
        GatewayEntry {
            gateway_url: Some("https://mcp-gw.example.com".to_string()),
            ..GatewayEntry::default()
        },
    );
    let state = gateway_state(options);

    let settings = resolve_mcp_settings(&state, state.mcp_gateway("tools").unwrap()).unwrap();
    assert!(!settings.fail_open);
    assert_eq!(settings.timeout_secs, 15);
}

// ============================================================================
// SECTION: Auth-Mode Inheritance
// ============================================================================

#[test]
fn test_entry_without_auth_mode_inherits_from_provider_default() {
    let mut options = InitOptions::default();
    options.gateway_mode.llm_gateways.register(
        "default-gw",
        GatewayEntry {
            gateway_url: Some("https://default.example.com".to_string()),
            provider: Some("bedrock".to_string()),
            default: true,
            auth_mode: Some("aws_sigv4".to_string()),
            ..GatewayEntry::default()
        },
    );
    options.gateway_mode.llm_gateways.register(
        "canary",
        GatewayEntry {
            gateway_url: Some("https://canary.example.com".to_string()),
            provider: Some("bedrock".to_string()),
            ..GatewayEntry::default()
        },
    );
    let state = gateway_state(options);

    let settings = resolve_llm_settings(
        &state,
        state.llm_gateway("canary").unwrap(),
        Some("bedrock"),
    )
    .unwrap();
    assert_eq!(settings.auth_mode, AuthMode::AwsSigv4);
}

#[test]
fn test_declared_auth_mode_is_never_overridden() {
    let mut options = InitOptions::default();
    options.gateway_mode.llm_gateways.register(
        "default-gw",
        GatewayEntry {
            gateway_url: Some("https://default.example.com".to_string()),
            provider: Some("bedrock".to_string()),
            default: true,
            auth_mode: Some("aws_sigv4".to_string()),
            ..GatewayEntry::default()
        },
    );
    options.gateway_mode.llm_gateways.register(
        "keyed",
        GatewayEntry {
            gateway_url: Some("https://keyed.example.com".to_string()),
            provider: Some("bedrock".to_string()),
            auth_mode: Some("api_key".to_string()),
            ..GatewayEntry::default()
        },
    );
    let state = gateway_state(options);

    let settings = resolve_llm_settings(
        &state,
        state.llm_gateway("keyed").unwrap(),
        Some("bedrock"),
    )
    .unwrap();
    assert_eq!(settings.auth_mode, AuthMode::ApiKey);
}

// ============================================================================
// SECTION: Provider Resolution
// ============================================================================

/// Gateway-mode options with a default entry per provider.
fn provider_options() -> InitOptions {
    let mut options = InitOptions {
        llm_integration_mode: Some("gateway".to_string()),
        ..InitOptions::default()
    };
    options.gateway_mode.llm_gateways.register(
        "openai-default",
        GatewayEntry {
            gateway_url: Some("https://openai-gw.example.com".to_string()),
            provider: Some("openai".to_string()),
            default: true,
            ..GatewayEntry::default()
        },
    );
    options.gateway_mode.llm_gateways.register(
        "anthropic-only",
        GatewayEntry {
            gateway_url: Some("https://anthropic-gw.example.com".to_string()),
            provider: Some("anthropic".to_string()),
            ..GatewayEntry::default()
        },
    );
    options
}

#[test]
fn test_provider_resolution_uses_the_default_entry() {
    let state = gateway_state(provider_options());
    let settings = resolve_for_provider(&state, "openai", None).unwrap().unwrap();
    assert_eq!(settings.url, "https://openai-gw.example.com");
}

#[test]
fn test_active_gateway_takes_precedence_over_the_default() {
    let mut options = provider_options();
    options.gateway_mode.llm_gateways.register(
        "shared",
        GatewayEntry {
            gateway_url: Some("https://shared-gw.example.com".to_string()),
            ..GatewayEntry::default()
        },
    );
    let state = gateway_state(options);

    let settings = resolve_for_provider(&state, "openai", Some("shared"))
        .unwrap()
        .unwrap();
    assert_eq!(settings.url, "https://shared-gw.example.com");
}

#[test]
fn test_active_gateway_for_another_provider_falls_through() {
    let state = gateway_state(provider_options());
    let settings = resolve_for_provider(&state, "openai", Some("anthropic-only"))
        .unwrap()
        .unwrap();
    assert_eq!(settings.url, "https://openai-gw.example.com");
}

#[test]
fn test_unknown_provider_resolves_to_none() {
    let state = gateway_state(provider_options());
    assert!(resolve_for_provider(&state, "mistral", None).is_none());
}

#[test]
fn test_api_mode_never_resolves_a_gateway() {
    let mut options = provider_options();
    options.llm_integration_mode = Some("api".to_string());
    let state = gateway_state(options);
    assert!(resolve_for_provider(&state, "openai", None).is_none());
}
