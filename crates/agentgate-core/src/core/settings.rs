// crates/agentgate-core/src/core/settings.rs
// ============================================================================
// Module: Gateway Settings
// Description: Fully resolved settings for one gateway connection.
// Purpose: Provide the merged configuration consumed by gateway callers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`GatewaySettings`] is the final, fully resolved configuration a gateway
//! caller uses: all entry overrides, category defaults, and hard fallbacks
//! have been applied before this value exists. The retry sub-policy is shared
//! with the API-mode inspectors, which carry different compiled-in defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as DeError;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Hard fallback timeout for gateway calls, in seconds.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 60;
/// Hard fallback retry total for gateway calls.
pub const DEFAULT_GATEWAY_RETRY_TOTAL: u32 = 3;
/// Hard fallback backoff factor for gateway calls, in seconds.
pub const DEFAULT_GATEWAY_RETRY_BACKOFF: f64 = 0.5;
/// Hard fallback status codes that trigger a gateway retry.
pub const DEFAULT_GATEWAY_RETRY_STATUS_CODES: &[u16] = &[429, 500, 502, 503, 504];
/// Hard fallback status codes that trigger an API-mode retry.
pub const DEFAULT_API_RETRY_STATUS_CODES: &[u16] = &[500, 502, 503, 504];

// ============================================================================
// SECTION: Auth Mode
// ============================================================================

/// Authentication mode for gateway connections.
///
/// # Invariants
/// - Parsing any label outside the taxonomy fails immediately; an invalid
///   auth mode never reaches a resolved [`GatewaySettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Static API key sent as a header.
    #[default]
    ApiKey,
    /// AWS Signature Version 4 request signing.
    AwsSigv4,
    /// Google Application Default Credentials.
    GoogleAdc,
}

impl AuthMode {
    /// Returns the stable configuration label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::AwsSigv4 => "aws_sigv4",
            Self::GoogleAdc => "google_adc",
        }
    }

    /// Parses a configuration label into an auth mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for labels outside the taxonomy.
    pub fn parse(label: &str) -> Result<Self, ConfigError> {
        match label {
            "api_key" => Ok(Self::ApiKey),
            "aws_sigv4" => Ok(Self::AwsSigv4),
            "google_adc" => Ok(Self::GoogleAdc),
            other => Err(ConfigError::InvalidValue {
                field: "auth_mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl Serialize for AuthMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuthMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::parse(&label).map_err(DeError::custom)
    }
}

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Retry configuration for one remote client.
///
/// # Invariants
/// - `total` is the number of attempts, not the number of retries; callers
///   clamp it to at least one.
/// - `backoff_factor` of zero disables all inter-attempt delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts before the client gives up.
    pub total: u32,
    /// Exponential backoff factor in seconds.
    pub backoff_factor: f64,
    /// HTTP status codes that trigger a retry.
    pub status_codes: BTreeSet<u16>,
}

impl RetryPolicy {
    /// Hard fallback retry policy for gateway calls.
    #[must_use]
    pub fn gateway_default() -> Self {
        Self {
            total: DEFAULT_GATEWAY_RETRY_TOTAL,
            backoff_factor: DEFAULT_GATEWAY_RETRY_BACKOFF,
            status_codes: DEFAULT_GATEWAY_RETRY_STATUS_CODES.iter().copied().collect(),
        }
    }

    /// Compiled-in retry policy for API-mode inspection calls.
    #[must_use]
    pub fn api_default() -> Self {
        Self {
            total: 1,
            backoff_factor: 0.0,
            status_codes: DEFAULT_API_RETRY_STATUS_CODES.iter().copied().collect(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::gateway_default()
    }
}

// ============================================================================
// SECTION: Gateway Settings
// ============================================================================

/// Resolved settings for a single gateway connection.
///
/// # Invariants
/// - `url` is always present; entries without a URL never resolve.
/// - `auth_mode` is one of the enumerated values by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Gateway URL the protected call is forwarded through.
    pub url: String,
    /// API key used when `auth_mode` is `api_key`.
    pub api_key: Option<String>,
    /// Authentication mode for the gateway connection.
    pub auth_mode: AuthMode,
    /// Allow the original call to proceed on gateway failure.
    pub fail_open: bool,
    /// Timeout for gateway calls, in seconds.
    pub timeout_secs: u64,
    /// Retry behavior for gateway calls.
    pub retry: RetryPolicy,
}

impl GatewaySettings {
    /// Creates settings for a URL with hard fallback values everywhere else.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            auth_mode: AuthMode::ApiKey,
            fail_open: true,
            timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
            retry: RetryPolicy::gateway_default(),
        }
    }

    /// Returns the call timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
