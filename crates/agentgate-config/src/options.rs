// crates/agentgate-config/src/options.rs
// ============================================================================
// Module: Init Options
// Description: Declarative option groups accepted at configuration time.
// Purpose: Model the raw init surface before validation into ConfigState.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`InitOptions`] is the raw, unvalidated configuration surface: hosts build
//! it programmatically or load it from a TOML file, then hand it to
//! [`crate::state::ConfigState::init`], which validates every enumerated
//! label and commits the result atomically. Mode and auth labels stay plain
//! strings here so validation failures carry the full dotted field path.
//!
//! Gateway tables preserve document order: when several entries for the same
//! provider are flagged as its default, the one registered last wins, so the
//! table must remember registration order rather than sort by name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde_json::Value;

// ============================================================================
// SECTION: Retry and Default Groups
// ============================================================================

/// Per-entry or per-category retry overrides.
///
/// Every field is optional; unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetryOptions {
    /// Total attempts before the client gives up.
    pub total: Option<u32>,
    /// Exponential backoff factor in seconds.
    pub backoff_factor: Option<f64>,
    /// HTTP status codes that trigger a retry.
    pub status_codes: Option<Vec<u16>>,
}

/// Category-level connection defaults for one channel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelDefaults {
    /// Allow the protected call to proceed on client failure.
    pub fail_open: Option<bool>,
    /// Call timeout in seconds.
    pub timeout: Option<u64>,
    /// Retry overrides for the channel.
    pub retry: Option<RetryOptions>,
}

// ============================================================================
// SECTION: API Mode
// ============================================================================

/// Per-channel API-mode options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiChannelOptions {
    /// Inspection mode label: `off`, `monitor`, or `enforce`.
    pub mode: Option<String>,
    /// Inspection endpoint URL.
    pub endpoint: Option<String>,
    /// Inspection API key.
    pub api_key: Option<String>,
    /// Inline inspection rules forwarded verbatim with each request.
    pub rules: Vec<Value>,
}

/// API-mode option group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiModeOptions {
    /// LLM channel options.
    pub llm: Option<ApiChannelOptions>,
    /// MCP channel options.
    pub mcp: Option<ApiChannelOptions>,
    /// Connection defaults for the LLM channel.
    pub llm_defaults: Option<ChannelDefaults>,
    /// Connection defaults for the MCP channel.
    pub mcp_defaults: Option<ChannelDefaults>,
}

// ============================================================================
// SECTION: Gateway Mode
// ============================================================================

/// One registered gateway entry, keyed by name in the table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayEntry {
    /// Gateway URL the protected call is forwarded through.
    pub gateway_url: Option<String>,
    /// API key for the gateway connection.
    pub gateway_api_key: Option<String>,
    /// Auth mode label: `api_key`, `aws_sigv4`, or `google_adc`.
    pub auth_mode: Option<String>,
    /// Provider this entry fronts, for default-gateway lookup.
    pub provider: Option<String>,
    /// Marks this entry as its provider's default gateway.
    pub default: bool,
    /// Allow the protected call to proceed on gateway failure.
    pub fail_open: Option<bool>,
    /// Gateway call timeout in seconds.
    pub timeout: Option<u64>,
    /// Retry overrides for this entry.
    pub retry: Option<RetryOptions>,
}

/// A named gateway registration.
#[derive(Debug, Clone)]
pub struct NamedGateway {
    /// Registration name of the entry.
    pub name: String,
    /// The entry itself.
    pub entry: GatewayEntry,
}

/// Ordered table of gateway registrations.
///
/// # Invariants
/// - Iteration order is registration order; lookups by name return the
///   last-registered match.
#[derive(Debug, Clone, Default)]
pub struct GatewayTable {
    /// Registrations in document order.
    entries: Vec<NamedGateway>,
}

impl GatewayTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers an entry under a name, after any existing registrations.
    pub fn register(&mut self, name: impl Into<String>, entry: GatewayEntry) {
        self.entries.push(NamedGateway {
            name: name.into(),
            entry,
        });
    }

    /// Returns the last-registered entry with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GatewayEntry> {
        self.entries
            .iter()
            .rev()
            .find(|named| named.name == name)
            .map(|named| &named.entry)
    }

    /// Looks up an entry by upstream URL, checking both the registration
    /// key and the entry's `gateway_url`. Last registration wins.
    #[must_use]
    pub fn get_by_url(&self, url: &str) -> Option<&GatewayEntry> {
        self.entries
            .iter()
            .rev()
            .find(|named| named.name == url || named.entry.gateway_url.as_deref() == Some(url))
            .map(|named| &named.entry)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedGateway> {
        self.entries.iter()
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table has no registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for GatewayTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Collects table entries in the order the document declares them.
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = GatewayTable;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a table of gateway entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut table = GatewayTable::new();
                while let Some((name, entry)) = map.next_entry::<String, GatewayEntry>()? {
                    table.register(name, entry);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Gateway-mode option group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayModeOptions {
    /// LLM gateway registrations, in document order.
    pub llm_gateways: GatewayTable,
    /// MCP gateway registrations, in document order.
    pub mcp_gateways: GatewayTable,
    /// Connection defaults for LLM gateway calls.
    pub llm_defaults: Option<ChannelDefaults>,
    /// Connection defaults for MCP gateway calls.
    pub mcp_defaults: Option<ChannelDefaults>,
}

// ============================================================================
// SECTION: Top Level
// ============================================================================

/// The full raw configuration surface accepted at init time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Integration mode label for the LLM channel: `api` or `gateway`.
    pub llm_integration_mode: Option<String>,
    /// Integration mode label for the MCP channel: `api` or `gateway`.
    pub mcp_integration_mode: Option<String>,
    /// API-mode option group.
    pub api_mode: ApiModeOptions,
    /// Gateway-mode option group.
    pub gateway_mode: GatewayModeOptions,
}
