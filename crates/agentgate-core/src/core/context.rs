// crates/agentgate-core/src/core/context.rs
// ============================================================================
// Module: Inspection Context
// Description: Per-call-chain record of in-flight inspection state.
// Purpose: Share verdict progress across cooperating interception points.
// Dependencies: crate::core::{decision, message}
// ============================================================================

//! ## Overview
//! One logical exchange (request plus response) may cross several
//! interception points that can each decide to inspect. The host creates one
//! [`InspectionScope`] per call chain and threads it through both halves;
//! clones of the handle share state, while scopes of sibling chains are
//! isolated by construction. The `done` flag marks the response half as
//! classified so a generic fallback point skips re-inspection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::core::decision::Decision;
use crate::core::message::Channel;
use crate::core::message::Metadata;

// ============================================================================
// SECTION: Context Record
// ============================================================================

/// Snapshot of per-call-chain inspection state.
///
/// # Invariants
/// - `done == true` means the response half has already been classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionContext {
    /// Ordered metadata accumulated for the exchange.
    metadata: Metadata,
    /// Most recent verdict recorded for the exchange.
    decision: Option<Decision>,
    /// True once the response half is classified.
    done: bool,
}

impl InspectionContext {
    /// Returns the accumulated metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the recorded verdict, when present.
    #[must_use]
    pub const fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }

    /// Returns true once the response half is classified.
    #[must_use]
    pub const fn done(&self) -> bool {
        self.done
    }
}

/// Partial overwrite applied to a scope's context record.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ContextUpdate {
    /// Replacement metadata map.
    pub metadata: Option<Metadata>,
    /// Replacement verdict.
    pub decision: Option<Decision>,
    /// Replacement done flag.
    pub done: Option<bool>,
}

// ============================================================================
// SECTION: Scope Handle
// ============================================================================

/// Internal state shared by clones of one scope handle.
#[derive(Debug, Default)]
struct ScopeState {
    /// The context record for this call chain.
    context: InspectionContext,
    /// Named gateway selected for calls made inside this chain.
    active_gateway: Option<String>,
    /// Skip request/response inspection on the LLM channel.
    skip_llm: bool,
    /// Skip request/response inspection on the MCP channel.
    skip_mcp: bool,
}

/// Per-call-chain handle for inspection state.
///
/// Cheap to clone; clones observe the same chain. Independently created
/// scopes never observe each other's mutations, and a chain that suspends at
/// a network call sees its own prior mutations after resuming because the
/// handle travels with the chain.
#[derive(Debug, Clone, Default)]
pub struct InspectionScope {
    /// Shared state behind a mutex; held only for short, non-suspending ops.
    inner: Arc<Mutex<ScopeState>>,
}

impl InspectionScope {
    /// Creates an empty scope for a new call chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the scope state, recovering from poisoning.
    ///
    /// No invariant spans a panic window here: every mutation writes whole
    /// fields, so the state is usable even after a poisoned lock.
    fn state(&self) -> MutexGuard<'_, ScopeState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of the current context record.
    #[must_use]
    pub fn get(&self) -> InspectionContext {
        self.state().context.clone()
    }

    /// Applies a partial overwrite to the context record.
    pub fn set(&self, update: ContextUpdate) {
        let mut state = self.state();
        if let Some(metadata) = update.metadata {
            state.context.metadata = metadata;
        }
        if let Some(decision) = update.decision {
            state.context.decision = Some(decision);
        }
        if let Some(done) = update.done {
            state.context.done = done;
        }
    }

    /// Merges metadata into the context record; later keys win.
    pub fn merge_metadata(&self, extra: Metadata) {
        let mut state = self.state();
        for (key, value) in extra {
            state.context.metadata.insert(key, value);
        }
    }

    /// Clears the context record back to its empty state.
    pub fn clear(&self) {
        self.state().context = InspectionContext::default();
    }

    /// Returns the active named gateway, when one is selected.
    #[must_use]
    pub fn active_gateway(&self) -> Option<String> {
        self.state().active_gateway.clone()
    }

    /// Selects a named gateway for calls made while the guard lives.
    ///
    /// Dropping the guard restores the previous selection.
    #[must_use]
    pub fn with_gateway(&self, name: impl Into<String>) -> GatewayGuard {
        let mut state = self.state();
        let previous = state.active_gateway.replace(name.into());
        GatewayGuard {
            scope: self.clone(),
            previous,
        }
    }

    /// Returns true when inspection is skipped for the channel.
    #[must_use]
    pub fn is_skipped(&self, channel: Channel) -> bool {
        let state = self.state();
        match channel {
            Channel::Llm => state.skip_llm,
            Channel::Mcp => state.skip_mcp,
        }
    }

    /// Suppresses inspection per channel while the guard lives.
    ///
    /// Dropping the guard restores the previous flags.
    #[must_use]
    pub fn skip(&self, llm: bool, mcp: bool) -> SkipGuard {
        let mut state = self.state();
        let previous = (state.skip_llm, state.skip_mcp);
        state.skip_llm = llm;
        state.skip_mcp = mcp;
        SkipGuard {
            scope: self.clone(),
            previous,
        }
    }
}

// ============================================================================
// SECTION: Guards
// ============================================================================

/// Restores the previously selected gateway on drop.
#[derive(Debug)]
pub struct GatewayGuard {
    /// Scope whose selection is restored.
    scope: InspectionScope,
    /// Selection in effect before the guard was created.
    previous: Option<String>,
}

impl Drop for GatewayGuard {
    fn drop(&mut self) {
        self.scope.state().active_gateway = self.previous.take();
    }
}

/// Restores the previous skip flags on drop.
#[derive(Debug)]
pub struct SkipGuard {
    /// Scope whose flags are restored.
    scope: InspectionScope,
    /// Flags in effect before the guard was created.
    previous: (bool, bool),
}

impl Drop for SkipGuard {
    fn drop(&mut self) {
        let mut state = self.scope.state();
        state.skip_llm = self.previous.0;
        state.skip_mcp = self.previous.1;
    }
}
