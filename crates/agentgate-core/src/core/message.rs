// crates/agentgate-core/src/core/message.rs
// ============================================================================
// Module: Normalized Messages
// Description: Normalized conversation and tool-call input types.
// Purpose: Define the inbound interface collaborators use to reach the core.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Collaborators (provider adapters, framework middleware) normalize calls
//! into these types before handing them to the inspection clients. The core
//! never sees provider-native request shapes except in gateway mode, where
//! the payload is forwarded verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Channels
// ============================================================================

/// Inspection channel classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Channel {
    /// LLM conversation traffic.
    Llm,
    /// MCP tool, prompt, and resource traffic.
    Mcp,
}

impl Channel {
    /// Returns a stable label for the channel.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::Mcp => "mcp",
        }
    }
}

// ============================================================================
// SECTION: Conversation Messages
// ============================================================================

/// Conversation role for a normalized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// End-user authored content.
    User,
    /// Model authored content.
    Assistant,
    /// Host-injected instruction content.
    System,
}

impl Role {
    /// Returns the stable wire label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One normalized conversation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Conversation role.
    pub role: Role,
    /// Message text content.
    pub content: String,
}

impl Message {
    /// Creates a message from a role and content.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered metadata map attached to an inspection.
pub type Metadata = BTreeMap<String, Value>;

// ============================================================================
// SECTION: MCP Methods
// ============================================================================

/// MCP request method classification.
///
/// # Invariants
/// - Labels match the JSON-RPC method strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum McpMethod {
    /// JSON-RPC tools/call.
    ToolsCall,
    /// JSON-RPC prompts/get.
    PromptsGet,
    /// JSON-RPC resources/read.
    ResourcesRead,
}

impl McpMethod {
    /// Returns the JSON-RPC method string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolsCall => "tools/call",
            Self::PromptsGet => "prompts/get",
            Self::ResourcesRead => "resources/read",
        }
    }

    /// Parses a JSON-RPC method string.
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "tools/call" => Some(Self::ToolsCall),
            "prompts/get" => Some(Self::PromptsGet),
            "resources/read" => Some(Self::ResourcesRead),
            _ => None,
        }
    }
}
