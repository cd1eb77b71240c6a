// crates/agentgate-config/src/env.rs
// ============================================================================
// Module: Environment Overrides
// Description: Environment-variable layer for inspection endpoints and keys.
// Purpose: Let deployments point inspectors at a service without code changes.
// Dependencies: std::env
// ============================================================================

//! ## Overview
//! The environment layer sits below committed state in the precedence order:
//! explicit constructor arguments win over state, state wins over these
//! variables, and the compiled-in behavior applies when nothing is set.
//! Blank values are treated as unset.
//!
//! Each accessor has a `_from` form taking the variable lookup as an
//! argument; the plain forms read the process environment through it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;

// ============================================================================
// SECTION: Variable Names
// ============================================================================

/// LLM inspection endpoint override.
pub const LLM_ENDPOINT_VAR: &str = "AGENTGATE_LLM_ENDPOINT";
/// LLM inspection API key override.
pub const LLM_API_KEY_VAR: &str = "AGENTGATE_LLM_API_KEY";
/// MCP inspection endpoint override.
pub const MCP_ENDPOINT_VAR: &str = "AGENTGATE_MCP_ENDPOINT";
/// MCP inspection API key override.
pub const MCP_API_KEY_VAR: &str = "AGENTGATE_MCP_API_KEY";

// ============================================================================
// SECTION: Accessors
// ============================================================================

/// Reads a variable from the process environment.
fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Applies the blank-is-unset rule to one looked-up value.
fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}

/// LLM inspection endpoint from the environment.
#[must_use]
pub fn llm_endpoint() -> Option<String> {
    llm_endpoint_from(&process_env)
}

/// LLM inspection endpoint through an explicit lookup.
pub fn llm_endpoint_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    non_empty(lookup, LLM_ENDPOINT_VAR)
}

/// LLM inspection API key from the environment.
#[must_use]
pub fn llm_api_key() -> Option<String> {
    llm_api_key_from(&process_env)
}

/// LLM inspection API key through an explicit lookup.
pub fn llm_api_key_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    non_empty(lookup, LLM_API_KEY_VAR)
}

/// MCP inspection endpoint from the environment, falling back to the LLM one.
#[must_use]
pub fn mcp_endpoint() -> Option<String> {
    mcp_endpoint_from(&process_env)
}

/// MCP inspection endpoint through an explicit lookup, falling back to the
/// LLM variable.
pub fn mcp_endpoint_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    non_empty(lookup, MCP_ENDPOINT_VAR).or_else(|| llm_endpoint_from(lookup))
}

/// MCP inspection API key from the environment, falling back to the LLM one.
#[must_use]
pub fn mcp_api_key() -> Option<String> {
    mcp_api_key_from(&process_env)
}

/// MCP inspection API key through an explicit lookup, falling back to the
/// LLM variable.
pub fn mcp_api_key_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    non_empty(lookup, MCP_API_KEY_VAR).or_else(|| llm_api_key_from(lookup))
}
