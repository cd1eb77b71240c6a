// crates/agentgate-client/src/lib.rs
// ============================================================================
// Module: AgentGate Client Library
// Description: Inspection and gateway clients over the core types.
// Purpose: Expose the LLM inspector, MCP inspector, and gateway client.
// Dependencies: crate::{gateway, inspector, llm, mcp, retry, transport}
// ============================================================================

//! ## Overview
//! Three clients, one transport. The LLM and MCP inspectors post exchanges
//! to the inspection API and map verdicts into decisions; the gateway client
//! forwards the protected call itself through a security gateway. All three
//! share the retry plan, the connection pools, and the transport failure
//! classification, and each comes in a blocking and an async form with
//! identical behavior.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod gateway;
mod inspector;
pub mod llm;
pub mod mcp;
pub mod retry;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gateway::GatewayClient;
pub use inspector::InspectorOverrides;
pub use llm::LlmInspector;
pub use mcp::McpInspector;
pub use retry::RetryPlan;
pub use transport::CHAT_INSPECT_PATH;
pub use transport::GATEWAY_API_KEY_HEADER;
pub use transport::INSPECTION_API_KEY_HEADER;
pub use transport::MCP_INSPECT_PATH;
pub use transport::normalize_endpoint;
