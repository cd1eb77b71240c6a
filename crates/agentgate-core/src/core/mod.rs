// crates/agentgate-core/src/core/mod.rs
// ============================================================================
// Module: AgentGate Core Types
// Description: Canonical verdict, context, message, and settings structures.
// Purpose: Provide stable, serializable types for inspection flows.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! AgentGate core types define the inspection verdict, the per-call-chain
//! inspection context, normalized conversation messages, and resolved gateway
//! settings. These types are the canonical source of truth for the client
//! crates and any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod context;
pub mod decision;
pub mod message;
pub mod settings;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::ContextUpdate;
pub use context::GatewayGuard;
pub use context::InspectionContext;
pub use context::InspectionScope;
pub use context::SkipGuard;
pub use decision::Action;
pub use decision::Decision;
pub use message::Channel;
pub use message::McpMethod;
pub use message::Message;
pub use message::Metadata;
pub use message::Role;
pub use settings::AuthMode;
pub use settings::DEFAULT_GATEWAY_RETRY_STATUS_CODES;
pub use settings::DEFAULT_GATEWAY_TIMEOUT_SECS;
pub use settings::GatewaySettings;
pub use settings::RetryPolicy;
