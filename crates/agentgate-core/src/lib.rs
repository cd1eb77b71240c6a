// crates/agentgate-core/src/lib.rs
// ============================================================================
// Module: AgentGate Core Library
// Description: Public API surface for the AgentGate core.
// Purpose: Expose decision, context, settings, error, and wire types.
// Dependencies: crate::{core, error, wire}
// ============================================================================

//! ## Overview
//! AgentGate core provides the inspection verdict model, the per-call-chain
//! inspection context, resolved gateway settings, the error taxonomy, and the
//! wire-response models shared by the sync and async inspection clients. It
//! is host-agnostic and integrates through plain value types rather than
//! embedding into agent frameworks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod error;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::Action;
pub use core::AuthMode;
pub use core::Channel;
pub use core::ContextUpdate;
pub use core::Decision;
pub use core::GatewayGuard;
pub use core::GatewaySettings;
pub use core::InspectionContext;
pub use core::InspectionScope;
pub use core::McpMethod;
pub use core::Message;
pub use core::Metadata;
pub use core::RetryPolicy;
pub use core::Role;
pub use core::SkipGuard;
pub use error::ConfigError;
pub use error::InspectError;
pub use wire::ChatInspectResponse;
pub use wire::McpInspectEnvelope;
pub use wire::McpInspectResult;
pub use wire::McpRpcError;
pub use wire::RpcId;
pub use wire::RuleMatch;
pub use wire::decision_from_chat_response;
pub use wire::decision_from_mcp_response;
