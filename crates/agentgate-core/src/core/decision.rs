// crates/agentgate-core/src/core/decision.rs
// ============================================================================
// Module: Inspection Decision
// Description: Immutable verdict value produced by inspection.
// Purpose: Provide the single source of truth for allow/block semantics.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Decision`] is the structured result of one security inspection. It is
//! constructed only through the named constructors and never mutated after
//! construction. Enforcement code must call [`Decision::allows`] instead of
//! matching on the action directly so the allow/block boundary stays in one
//! place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Action
// ============================================================================

/// Action taxonomy for inspection verdicts.
///
/// # Invariants
/// - Serialized labels are stable wire/telemetry identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The call may proceed unchanged.
    Allow,
    /// The call must not proceed.
    Block,
    /// The call may proceed with sanitized content substituted.
    Sanitize,
    /// The call proceeds; the verdict is recorded for audit only.
    MonitorOnly,
}

impl Action {
    /// Returns the stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Block => "block",
            Self::Sanitize => "sanitize",
            Self::MonitorOnly => "monitor_only",
        }
    }

    /// Parses a wire action label, case-insensitively.
    ///
    /// Returns `None` for labels outside the taxonomy; callers at the wire
    /// boundary decide how unknown labels degrade.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "block" => Some(Self::Block),
            "sanitize" => Some(Self::Sanitize),
            "monitor_only" => Some(Self::MonitorOnly),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Structured inspection verdict.
///
/// # Invariants
/// - `allows() == (action != Action::Block)`.
/// - `sanitized_content` is meaningful only when `action == Action::Sanitize`.
/// - Equality ignores `raw_response`; it is an opaque diagnostic payload.
/// - Empty `reasons` on block/sanitize is permitted by convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Action to take for the inspected call.
    action: Action,
    /// Ordered reasons explaining the verdict.
    reasons: Vec<String>,
    /// Replacement content when the action is sanitize.
    sanitized_content: Option<String>,
    /// Raw remote response retained for diagnostics.
    raw_response: Option<Value>,
}

impl Decision {
    /// Creates an allow decision with no reasons.
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            action: Action::Allow,
            reasons: Vec::new(),
            sanitized_content: None,
            raw_response: None,
        }
    }

    /// Creates an allow decision annotated with reasons.
    ///
    /// Used by fail-open paths to record the error class that was tolerated.
    #[must_use]
    pub const fn allow_with_reasons(reasons: Vec<String>) -> Self {
        Self {
            action: Action::Allow,
            reasons,
            sanitized_content: None,
            raw_response: None,
        }
    }

    /// Creates a block decision.
    #[must_use]
    pub const fn block(reasons: Vec<String>) -> Self {
        Self {
            action: Action::Block,
            reasons,
            sanitized_content: None,
            raw_response: None,
        }
    }

    /// Creates a sanitize decision carrying optional replacement content.
    #[must_use]
    pub const fn sanitize(reasons: Vec<String>, sanitized_content: Option<String>) -> Self {
        Self {
            action: Action::Sanitize,
            reasons,
            sanitized_content,
            raw_response: None,
        }
    }

    /// Creates a monitor-only decision.
    #[must_use]
    pub const fn monitor_only(reasons: Vec<String>) -> Self {
        Self {
            action: Action::MonitorOnly,
            reasons,
            sanitized_content: None,
            raw_response: None,
        }
    }

    /// Attaches the raw remote response for diagnostics.
    #[must_use]
    pub fn with_raw_response(mut self, raw_response: Value) -> Self {
        self.raw_response = Some(raw_response);
        self
    }

    /// Returns true when this verdict lets the call proceed.
    ///
    /// This is the single source of truth for "may proceed"; enforcement code
    /// must not compare actions directly.
    #[must_use]
    pub fn allows(&self) -> bool {
        self.action != Action::Block
    }

    /// Returns the action for this verdict.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Returns the ordered reasons for this verdict.
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Returns the sanitized replacement content, when present.
    #[must_use]
    pub fn sanitized_content(&self) -> Option<&str> {
        self.sanitized_content.as_deref()
    }

    /// Returns the raw remote response, when present.
    #[must_use]
    pub const fn raw_response(&self) -> Option<&Value> {
        self.raw_response.as_ref()
    }
}

impl PartialEq for Decision {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action
            && self.reasons == other.reasons
            && self.sanitized_content == other.sanitized_content
    }
}

impl Eq for Decision {}
