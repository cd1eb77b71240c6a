// crates/agentgate-config/src/lib.rs
// ============================================================================
// Module: AgentGate Config Library
// Description: Layered configuration for inspection clients.
// Purpose: Expose init options, validated state, resolution, and file loading.
// Dependencies: crate::{env, file, options, resolver, state}
// ============================================================================

//! ## Overview
//! Configuration flows through three stages: raw [`InitOptions`] built in
//! code or loaded from a TOML file, validation into [`ConfigState`], and
//! per-call resolution into [`agentgate_core::GatewaySettings`]. Precedence
//! everywhere is explicit argument over committed state over environment
//! variable over compiled-in default.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod env;
pub mod file;
pub mod options;
pub mod resolver;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use file::CONFIG_PATH_ENV_VAR;
pub use file::load_config_file;
pub use file::load_default_config_file;
pub use options::ApiChannelOptions;
pub use options::ApiModeOptions;
pub use options::ChannelDefaults;
pub use options::GatewayEntry;
pub use options::GatewayModeOptions;
pub use options::GatewayTable;
pub use options::InitOptions;
pub use options::NamedGateway;
pub use options::RetryOptions;
pub use resolver::resolve_for_provider;
pub use resolver::resolve_llm_settings;
pub use resolver::resolve_mcp_settings;
pub use state::ConfigState;
pub use state::InspectionMode;
pub use state::IntegrationMode;
pub use state::ResolvedDefaults;
pub use state::global;
pub use state::init;
pub use state::read_global;
pub use state::reset;
pub use state::write_global;
