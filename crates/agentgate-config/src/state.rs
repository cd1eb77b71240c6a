// crates/agentgate-config/src/state.rs
// ============================================================================
// Module: Configuration State
// Description: Validated, layered runtime configuration.
// Purpose: Hold the committed configuration consumed by inspectors and clients.
// Dependencies: serde_json, agentgate-core, crate::options
// ============================================================================

//! ## Overview
//! [`ConfigState`] is the validated form of [`InitOptions`]: every enumerated
//! label has been parsed, category defaults have been merged over hard
//! fallbacks, and the provider-default index has been built. Validation is
//! all-or-nothing; a rejected option set leaves the previous state untouched.
//!
//! A process-wide instance is available through [`global`] for hosts that
//! configure once at startup, with [`init`] and [`reset`] as the lifecycle
//! entry points. Embedders that need several independent configurations can
//! hold their own [`ConfigState`] values instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use serde_json::Value;

use agentgate_core::AuthMode;
use agentgate_core::ConfigError;
use agentgate_core::RetryPolicy;
use agentgate_core::core::settings::DEFAULT_GATEWAY_TIMEOUT_SECS;

use crate::options::ChannelDefaults;
use crate::options::GatewayTable;
use crate::options::InitOptions;
use crate::options::RetryOptions;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Compiled-in timeout for API-mode inspection calls, in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// SECTION: Mode Taxonomies
// ============================================================================

/// How a channel integrates with the inspection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMode {
    /// Direct inspection API calls around the protected call.
    #[default]
    Api,
    /// Forwarding the protected call through a security gateway.
    Gateway,
}

impl IntegrationMode {
    /// Returns the stable configuration label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Gateway => "gateway",
        }
    }

    /// Parses a configuration label, naming `field` on failure.
    fn parse(field: &str, label: &str) -> Result<Self, ConfigError> {
        match label {
            "api" => Ok(Self::Api),
            "gateway" => Ok(Self::Gateway),
            other => Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// What an API-mode inspector does with a blocking verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InspectionMode {
    /// Inspection disabled for the channel.
    Off,
    /// Inspect and record verdicts without enforcing them.
    #[default]
    Monitor,
    /// Inspect and raise on blocking verdicts.
    Enforce,
}

impl InspectionMode {
    /// Returns the stable configuration label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Monitor => "monitor",
            Self::Enforce => "enforce",
        }
    }

    /// Parses a configuration label, naming `field` on failure.
    fn parse(field: &str, label: &str) -> Result<Self, ConfigError> {
        match label {
            "off" => Ok(Self::Off),
            "monitor" => Ok(Self::Monitor),
            "enforce" => Ok(Self::Enforce),
            other => Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Validated Sub-State
// ============================================================================

/// Validated API-mode settings for one channel.
#[derive(Debug, Clone, Default)]
pub struct ApiChannelState {
    /// Inspection mode for the channel, when configured.
    pub mode: Option<InspectionMode>,
    /// Inspection endpoint, when configured.
    pub endpoint: Option<String>,
    /// Inspection API key, when configured.
    pub api_key: Option<String>,
}

/// Fully merged connection defaults for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDefaults {
    /// Allow the protected call to proceed on client failure.
    pub fail_open: bool,
    /// Call timeout in seconds.
    pub timeout_secs: u64,
    /// Retry behavior.
    pub retry: RetryPolicy,
}

impl ResolvedDefaults {
    /// Hard fallback defaults for gateway calls.
    #[must_use]
    pub fn gateway() -> Self {
        Self {
            fail_open: true,
            timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
            retry: RetryPolicy::gateway_default(),
        }
    }

    /// Compiled-in defaults for API-mode inspection calls.
    #[must_use]
    pub fn api() -> Self {
        Self {
            fail_open: false,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            retry: RetryPolicy::api_default(),
        }
    }

    /// Applies declared overrides over this layer.
    fn overlaid(&self, overrides: Option<&ChannelDefaults>) -> Self {
        let Some(overrides) = overrides else {
            return self.clone();
        };
        Self {
            fail_open: overrides.fail_open.unwrap_or(self.fail_open),
            timeout_secs: overrides.timeout.unwrap_or(self.timeout_secs),
            retry: overlay_retry(&self.retry, overrides.retry.as_ref()),
        }
    }
}

/// Applies per-field retry overrides over a base policy.
pub(crate) fn overlay_retry(base: &RetryPolicy, overrides: Option<&RetryOptions>) -> RetryPolicy {
    let Some(overrides) = overrides else {
        return base.clone();
    };
    RetryPolicy {
        total: overrides.total.unwrap_or(base.total),
        backoff_factor: overrides.backoff_factor.unwrap_or(base.backoff_factor),
        status_codes: overrides
            .status_codes
            .as_ref()
            .map_or_else(|| base.status_codes.clone(), |codes| codes.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Configuration State
// ============================================================================

/// The committed, validated runtime configuration.
///
/// # Invariants
/// - Every mode and auth label held here parsed successfully at init time.
/// - `init` replaces the whole state atomically; partial option sets never
///   leak into getters.
#[derive(Debug, Clone)]
pub struct ConfigState {
    /// True once an option set has been committed.
    initialized: bool,
    /// Integration mode of the LLM channel.
    llm_integration_mode: IntegrationMode,
    /// Integration mode of the MCP channel.
    mcp_integration_mode: IntegrationMode,
    /// API-mode settings for the LLM channel.
    api_llm: ApiChannelState,
    /// API-mode settings for the MCP channel.
    api_mcp: ApiChannelState,
    /// Inline inspection rules for the LLM channel.
    llm_rules: Vec<Value>,
    /// Merged connection defaults for API-mode LLM inspection.
    api_llm_defaults: ResolvedDefaults,
    /// Merged connection defaults for API-mode MCP inspection.
    api_mcp_defaults: ResolvedDefaults,
    /// LLM gateway registrations in document order.
    llm_gateways: GatewayTable,
    /// MCP gateway registrations in document order.
    mcp_gateways: GatewayTable,
    /// Merged connection defaults for LLM gateway calls.
    gateway_llm_defaults: ResolvedDefaults,
    /// Merged connection defaults for MCP gateway calls.
    gateway_mcp_defaults: ResolvedDefaults,
    /// Provider name to default gateway entry name, last registration wins.
    provider_defaults: BTreeMap<String, String>,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            initialized: false,
            llm_integration_mode: IntegrationMode::Api,
            mcp_integration_mode: IntegrationMode::Api,
            api_llm: ApiChannelState::default(),
            api_mcp: ApiChannelState::default(),
            llm_rules: Vec::new(),
            api_llm_defaults: ResolvedDefaults::api(),
            api_mcp_defaults: ResolvedDefaults::api(),
            llm_gateways: GatewayTable::new(),
            mcp_gateways: GatewayTable::new(),
            gateway_llm_defaults: ResolvedDefaults::gateway(),
            gateway_mcp_defaults: ResolvedDefaults::gateway(),
            provider_defaults: BTreeMap::new(),
        }
    }
}

impl ConfigState {
    /// Creates the unconfigured state with compiled-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and commits an option set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the dotted field path of
    /// the first label outside its taxonomy. On error the previous state is
    /// left untouched.
    pub fn init(&mut self, options: InitOptions) -> Result<(), ConfigError> {
        let mut next = Self::new();

        if let Some(label) = &options.llm_integration_mode {
            next.llm_integration_mode = IntegrationMode::parse("llm_integration_mode", label)?;
        }
        if let Some(label) = &options.mcp_integration_mode {
            next.mcp_integration_mode = IntegrationMode::parse("mcp_integration_mode", label)?;
        }

        if let Some(llm) = &options.api_mode.llm {
            next.api_llm = Self::validate_api_channel("api_mode.llm.mode", llm.mode.as_deref(), llm)?;
            next.llm_rules = llm.rules.clone();
        }
        if let Some(mcp) = &options.api_mode.mcp {
            next.api_mcp = Self::validate_api_channel("api_mode.mcp.mode", mcp.mode.as_deref(), mcp)?;
        }
        next.api_llm_defaults =
            ResolvedDefaults::api().overlaid(options.api_mode.llm_defaults.as_ref());
        next.api_mcp_defaults =
            ResolvedDefaults::api().overlaid(options.api_mode.mcp_defaults.as_ref());

        Self::validate_gateways("gateway_mode.llm_gateways", &options.gateway_mode.llm_gateways)?;
        Self::validate_gateways("gateway_mode.mcp_gateways", &options.gateway_mode.mcp_gateways)?;
        next.gateway_llm_defaults =
            ResolvedDefaults::gateway().overlaid(options.gateway_mode.llm_defaults.as_ref());
        next.gateway_mcp_defaults =
            ResolvedDefaults::gateway().overlaid(options.gateway_mode.mcp_defaults.as_ref());

        for named in options.gateway_mode.llm_gateways.iter() {
            if named.entry.default
                && let Some(provider) = &named.entry.provider
            {
                next.provider_defaults
                    .insert(provider.clone(), named.name.clone());
            }
        }
        next.llm_gateways = options.gateway_mode.llm_gateways;
        next.mcp_gateways = options.gateway_mode.mcp_gateways;

        next.initialized = true;
        *self = next;
        Ok(())
    }

    /// Reconfigures in place. Alias for [`Self::init`]; each call replaces
    /// the whole committed state rather than merging into it.
    ///
    /// # Errors
    ///
    /// See [`Self::init`].
    pub fn apply(&mut self, options: InitOptions) -> Result<(), ConfigError> {
        self.init(options)
    }

    /// Restores the unconfigured state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Parses one API channel's mode label into validated channel state.
    fn validate_api_channel(
        mode_field: &str,
        mode: Option<&str>,
        channel: &crate::options::ApiChannelOptions,
    ) -> Result<ApiChannelState, ConfigError> {
        let mode = mode
            .map(|label| InspectionMode::parse(mode_field, label))
            .transpose()?;
        Ok(ApiChannelState {
            mode,
            endpoint: channel.endpoint.clone(),
            api_key: channel.api_key.clone(),
        })
    }

    /// Rejects gateway entries whose auth-mode label is outside the taxonomy.
    fn validate_gateways(prefix: &str, table: &GatewayTable) -> Result<(), ConfigError> {
        for named in table.iter() {
            if let Some(label) = &named.entry.auth_mode {
                AuthMode::parse(label).map_err(|_| ConfigError::InvalidValue {
                    field: format!("{prefix}.{}.auth_mode", named.name),
                    value: label.clone(),
                })?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    /// Returns whether a configuration has been committed.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Integration mode of the LLM channel.
    #[must_use]
    pub const fn llm_integration_mode(&self) -> IntegrationMode {
        self.llm_integration_mode
    }

    /// Integration mode of the MCP channel.
    #[must_use]
    pub const fn mcp_integration_mode(&self) -> IntegrationMode {
        self.mcp_integration_mode
    }

    /// API-mode inspection mode of the LLM channel.
    #[must_use]
    pub fn api_llm_mode(&self) -> InspectionMode {
        self.api_llm.mode.unwrap_or_default()
    }

    /// API-mode inspection mode of the MCP channel.
    #[must_use]
    pub fn api_mcp_mode(&self) -> InspectionMode {
        self.api_mcp.mode.unwrap_or_default()
    }

    /// Configured LLM inspection endpoint.
    #[must_use]
    pub fn api_llm_endpoint(&self) -> Option<&str> {
        self.api_llm.endpoint.as_deref()
    }

    /// Configured MCP inspection endpoint, falling back to the LLM one.
    #[must_use]
    pub fn api_mcp_endpoint(&self) -> Option<&str> {
        self.api_mcp
            .endpoint
            .as_deref()
            .or(self.api_llm.endpoint.as_deref())
    }

    /// Configured LLM inspection API key.
    #[must_use]
    pub fn api_llm_key(&self) -> Option<&str> {
        self.api_llm.api_key.as_deref()
    }

    /// Configured MCP inspection API key, falling back to the LLM one.
    #[must_use]
    pub fn api_mcp_key(&self) -> Option<&str> {
        self.api_mcp
            .api_key
            .as_deref()
            .or(self.api_llm.api_key.as_deref())
    }

    /// Inline inspection rules for the LLM channel.
    #[must_use]
    pub fn llm_rules(&self) -> &[Value] {
        &self.llm_rules
    }

    /// Merged connection defaults for API-mode LLM inspection.
    #[must_use]
    pub const fn api_llm_defaults(&self) -> &ResolvedDefaults {
        &self.api_llm_defaults
    }

    /// Merged connection defaults for API-mode MCP inspection.
    #[must_use]
    pub const fn api_mcp_defaults(&self) -> &ResolvedDefaults {
        &self.api_mcp_defaults
    }

    /// Merged connection defaults for LLM gateway calls.
    #[must_use]
    pub const fn gateway_llm_defaults(&self) -> &ResolvedDefaults {
        &self.gateway_llm_defaults
    }

    /// Merged connection defaults for MCP gateway calls.
    #[must_use]
    pub const fn gateway_mcp_defaults(&self) -> &ResolvedDefaults {
        &self.gateway_mcp_defaults
    }

    /// LLM gateway registrations in registration order.
    #[must_use]
    pub const fn llm_gateways(&self) -> &GatewayTable {
        &self.llm_gateways
    }

    /// MCP gateway registrations in registration order.
    #[must_use]
    pub const fn mcp_gateways(&self) -> &GatewayTable {
        &self.mcp_gateways
    }

    /// Looks up an LLM gateway entry by registration name.
    #[must_use]
    pub fn llm_gateway(&self, name: &str) -> Option<&crate::options::GatewayEntry> {
        self.llm_gateways.get(name)
    }

    /// Looks up an MCP gateway entry by registration name.
    #[must_use]
    pub fn mcp_gateway(&self, name: &str) -> Option<&crate::options::GatewayEntry> {
        self.mcp_gateways.get(name)
    }

    /// Looks up an MCP gateway entry by upstream URL.
    ///
    /// Entries registered under their URL match by key; entries registered
    /// under another name match on `gateway_url`. Last registration wins.
    #[must_use]
    pub fn mcp_gateway_for_url(&self, url: &str) -> Option<&crate::options::GatewayEntry> {
        self.mcp_gateways.get_by_url(url)
    }

    /// Name of the default gateway for a provider, last registration winning.
    #[must_use]
    pub fn default_gateway_name(&self, provider: &str) -> Option<&str> {
        self.provider_defaults.get(provider).map(String::as_str)
    }

    /// Default gateway entry for a provider.
    #[must_use]
    pub fn default_gateway(&self, provider: &str) -> Option<&crate::options::GatewayEntry> {
        self.default_gateway_name(provider)
            .and_then(|name| self.llm_gateways.get(name))
    }
}

// ============================================================================
// SECTION: Process-Wide State
// ============================================================================

/// Process-wide configuration, created unconfigured on first access.
static GLOBAL_STATE: OnceLock<RwLock<ConfigState>> = OnceLock::new();

/// Returns the process-wide configuration lock.
pub fn global() -> &'static RwLock<ConfigState> {
    GLOBAL_STATE.get_or_init(|| RwLock::new(ConfigState::new()))
}

/// Acquires a read guard on the process-wide state, recovering from poison.
pub fn read_global() -> RwLockReadGuard<'static, ConfigState> {
    global().read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquires a write guard on the process-wide state, recovering from poison.
pub fn write_global() -> RwLockWriteGuard<'static, ConfigState> {
    global().write().unwrap_or_else(PoisonError::into_inner)
}

/// Validates and commits an option set into the process-wide state.
///
/// # Errors
///
/// Propagates [`ConfigState::init`] failures; the previous process-wide
/// state is left untouched on error.
pub fn init(options: InitOptions) -> Result<(), ConfigError> {
    write_global().init(options)
}

/// Restores the process-wide state to its unconfigured form.
pub fn reset() {
    write_global().reset();
}
