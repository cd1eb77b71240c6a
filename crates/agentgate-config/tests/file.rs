// crates/agentgate-config/tests/file.rs
// ============================================================================
// Module: Config File Tests
// Description: Tests for TOML loading and environment substitution.
// ============================================================================
//! ## Overview
//! Validates file loading, `${VAR}` substitution, size and existence
//! checks, and document-order preservation for gateway tables.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::fs;
use std::path::Path;

use agentgate_config::load_config_file;
use agentgate_core::ConfigError;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Writes a config document into a temporary directory.
fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("agentgate.toml");
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn test_full_document_loads() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
llm_integration_mode = "gateway"

[api_mode.llm]
mode = "enforce"
endpoint = "https://inspect.example.com"
api_key = "inline-key"

[gateway_mode.llm_defaults]
fail_open = false
timeout = 10

[gateway_mode.llm_gateways.primary]
gateway_url = "https://gw.example.com"
provider = "openai"
default = true
"#,
    );

    let options = load_config_file(&path).unwrap();
    assert_eq!(options.llm_integration_mode.as_deref(), Some("gateway"));
    let llm = options.api_mode.llm.unwrap();
    assert_eq!(llm.mode.as_deref(), Some("enforce"));
    assert_eq!(llm.api_key.as_deref(), Some("inline-key"));
    let defaults = options.gateway_mode.llm_defaults.unwrap();
    assert_eq!(defaults.fail_open, Some(false));
    assert_eq!(defaults.timeout, Some(10));
    let entry = options.gateway_mode.llm_gateways.get("primary").unwrap();
    assert!(entry.default);
    assert_eq!(entry.provider.as_deref(), Some("openai"));
}

#[test]
fn test_gateway_tables_preserve_document_order() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[gateway_mode.llm_gateways.zeta]
gateway_url = "https://zeta.example.com"

[gateway_mode.llm_gateways.alpha]
gateway_url = "https://alpha.example.com"
"#,
    );

    let options = load_config_file(&path).unwrap();
    let names: Vec<&str> = options
        .gateway_mode
        .llm_gateways
        .iter()
        .map(|named| named.name.as_str())
        .collect();
    assert_eq!(names, ["zeta", "alpha"]);
}

#[test]
fn test_missing_file_is_reported() {
    let err = load_config_file(Path::new("/nonexistent/agentgate.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "llm_integration_mode = [unbalanced");
    let err = load_config_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed(_)));
}

// ============================================================================
// SECTION: Environment Substitution
// ============================================================================

#[test]
fn test_placeholders_substitute_from_the_environment() {
    // HOME is guaranteed in the test environment; no mutation needed.
    let home = std::env::var("HOME").unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[api_mode.llm]
endpoint = "https://inspect.example.com"
api_key = "${HOME}"
"#,
    );

    let options = load_config_file(&path).unwrap();
    assert_eq!(options.api_mode.llm.unwrap().api_key.as_deref(), Some(home.as_str()));
}

#[test]
fn test_unterminated_placeholder_is_left_verbatim() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[api_mode.llm]
api_key = "${UNTERMINATED"
"#,
    );

    let options = load_config_file(&path).unwrap();
    assert_eq!(
        options.api_mode.llm.unwrap().api_key.as_deref(),
        Some("${UNTERMINATED")
    );
}

#[test]
fn test_unset_placeholder_fails_the_load() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[api_mode.llm]
api_key = "${AGENTGATE_TEST_SURELY_UNSET_VAR}"
"#,
    );

    let err = load_config_file(&path).unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingEnvVar("AGENTGATE_TEST_SURELY_UNSET_VAR".to_string())
    );
}
