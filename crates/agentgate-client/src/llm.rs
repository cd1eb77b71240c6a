// crates/agentgate-client/src/llm.rs
// ============================================================================
// Module: LLM Inspector
// Description: Chat inspection client for the LLM channel.
// Purpose: Classify prompts, responses, and conversations before use.
// Dependencies: serde_json, tokio, tracing, agentgate-core, agentgate-config
// ============================================================================

//! ## Overview
//! The LLM inspector posts conversations to the chat inspection endpoint and
//! maps the verdict into a [`Decision`]. The channel mode gates behavior:
//! `off` answers allow without a network call, `monitor` returns the verdict
//! for the host to record, `enforce` raises on a blocking verdict. An
//! inspector whose endpoint or key is unresolved after all precedence layers
//! answers allow, so hosts can ship with inspection dormant until deployment
//! configures it.
//!
//! The async methods run the exchange on a detached task, so a caller that
//! is cancelled mid-await does not abort the in-flight inspection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use tracing::debug;
use tracing::warn;

use agentgate_config::ConfigState;
use agentgate_config::InspectionMode;
use agentgate_core::Channel;
use agentgate_core::ConfigError;
use agentgate_core::ContextUpdate;
use agentgate_core::Decision;
use agentgate_core::InspectError;
use agentgate_core::InspectionScope;
use agentgate_core::Message;
use agentgate_core::Metadata;
use agentgate_core::Role;
use agentgate_core::decision_from_chat_response;

use crate::inspector::ChannelProfile;
use crate::inspector::InspectorOverrides;
use crate::inspector::settle_failure;
use crate::transport::CHAT_INSPECT_PATH;
use crate::transport::INSPECTION_API_KEY_HEADER;
use crate::transport::api_key_headers;
use crate::transport::post_json;
use crate::transport::post_json_async;

// ============================================================================
// SECTION: Inspector
// ============================================================================

/// Chat inspection client for the LLM channel.
///
/// Cheap to clone; clones share the connection pools and the scope handle.
#[derive(Debug, Clone)]
pub struct LlmInspector {
    /// Resolved connection profile.
    profile: ChannelProfile,
    /// Inline inspection rules forwarded with each request.
    rules: Vec<Value>,
    /// Call-chain scope, when the host threads one through.
    scope: Option<InspectionScope>,
}

impl LlmInspector {
    /// Builds an inspector over committed state plus explicit overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the resolved endpoint is
    /// not a valid URL.
    pub fn new(state: &ConfigState, overrides: InspectorOverrides) -> Result<Self, ConfigError> {
        Ok(Self {
            profile: ChannelProfile::llm(state, &overrides)?,
            rules: state.llm_rules().to_vec(),
            scope: None,
        })
    }

    /// Attaches the call-chain scope this inspector reports into.
    #[must_use]
    pub fn with_scope(mut self, scope: InspectionScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Inspects a user prompt before it is sent.
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_conversation`].
    pub fn inspect_prompt(
        &self,
        prompt: &str,
        metadata: Option<&Metadata>,
    ) -> Result<Decision, InspectError> {
        let messages = [Message::new(Role::User, prompt)];
        self.inspect_conversation(&messages, metadata)
    }

    /// Inspects a model response before it is used.
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_conversation`].
    pub fn inspect_response(
        &self,
        response: &str,
        metadata: Option<&Metadata>,
    ) -> Result<Decision, InspectError> {
        let messages = [Message::new(Role::Assistant, response)];
        self.inspect_conversation(&messages, metadata)
    }

    /// Inspects a conversation and applies the channel mode.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::PolicyBlocked`] in enforce mode on a blocking
    /// verdict, and transport failures per the fail-open policy.
    pub fn inspect_conversation(
        &self,
        messages: &[Message],
        metadata: Option<&Metadata>,
    ) -> Result<Decision, InspectError> {
        let exchange = match self.prepare(messages, metadata) {
            Ok(Some(exchange)) => exchange,
            Ok(None) => return Ok(Decision::allow()),
            Err(err) => return self.settle(messages, Err(err)),
        };
        let outcome = post_json(
            &exchange.url,
            exchange.headers,
            &exchange.payload,
            self.profile.timeout,
            &self.profile.plan,
        );
        self.settle(messages, outcome)
    }

    /// Async form of [`Self::inspect_prompt`].
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_conversation`].
    pub async fn inspect_prompt_async(
        &self,
        prompt: &str,
        metadata: Option<&Metadata>,
    ) -> Result<Decision, InspectError> {
        let messages = [Message::new(Role::User, prompt)];
        self.inspect_conversation_async(&messages, metadata).await
    }

    /// Async form of [`Self::inspect_response`].
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_conversation`].
    pub async fn inspect_response_async(
        &self,
        response: &str,
        metadata: Option<&Metadata>,
    ) -> Result<Decision, InspectError> {
        let messages = [Message::new(Role::Assistant, response)];
        self.inspect_conversation_async(&messages, metadata).await
    }

    /// Async form of [`Self::inspect_conversation`].
    ///
    /// The exchange runs on a detached task; dropping this future does not
    /// abort the in-flight inspection.
    ///
    /// # Errors
    ///
    /// See [`Self::inspect_conversation`].
    pub async fn inspect_conversation_async(
        &self,
        messages: &[Message],
        metadata: Option<&Metadata>,
    ) -> Result<Decision, InspectError> {
        let exchange = match self.prepare(messages, metadata) {
            Ok(Some(exchange)) => exchange,
            Ok(None) => return Ok(Decision::allow()),
            Err(err) => return self.settle(messages, Err(err)),
        };
        let timeout = self.profile.timeout;
        let plan = self.profile.plan.clone();
        let handle = tokio::spawn(async move {
            post_json_async(&exchange.url, exchange.headers, &exchange.payload, timeout, &plan)
                .await
        });
        let outcome = handle.await.map_err(|err| InspectError::Network {
            message: err.to_string(),
            decision: Decision::block(vec!["inspection task failed".to_string()]),
        })?;
        self.settle(messages, outcome)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Builds the outbound exchange, or `None` when no call should be made.
    fn prepare(
        &self,
        messages: &[Message],
        metadata: Option<&Metadata>,
    ) -> Result<Option<PreparedExchange>, crate::transport::TransportError> {
        if self.profile.mode == InspectionMode::Off {
            return Ok(None);
        }
        if self
            .scope
            .as_ref()
            .is_some_and(|scope| scope.is_skipped(Channel::Llm))
        {
            return Ok(None);
        }
        let (Some(endpoint), Some(api_key)) = (&self.profile.endpoint, &self.profile.api_key)
        else {
            debug!("llm inspection unconfigured, allowing");
            return Ok(None);
        };

        let mut merged: Metadata = self
            .scope
            .as_ref()
            .map(|scope| scope.get().metadata().clone())
            .unwrap_or_default();
        if let Some(extra) = metadata {
            for (key, value) in extra {
                merged.insert(key.clone(), value.clone());
            }
        }

        let mut payload = json!({ "messages": messages, "metadata": merged });
        if !self.rules.is_empty() {
            payload["rules"] = json!(self.rules);
        }
        let headers = api_key_headers(INSPECTION_API_KEY_HEADER, api_key)?;
        Ok(Some(PreparedExchange {
            url: format!("{endpoint}{CHAT_INSPECT_PATH}"),
            headers,
            payload,
        }))
    }

    /// Maps the transport outcome to a verdict and applies the mode.
    fn settle(
        &self,
        messages: &[Message],
        outcome: Result<Value, crate::transport::TransportError>,
    ) -> Result<Decision, InspectError> {
        let decision = match outcome {
            Ok(body) => decision_from_chat_response(body)?,
            Err(err) => settle_failure(self.profile.fail_open, err)?,
        };

        if let Some(scope) = &self.scope {
            let response_half = messages
                .last()
                .is_some_and(|message| message.role == Role::Assistant);
            scope.set(ContextUpdate {
                metadata: None,
                decision: Some(decision.clone()),
                done: response_half.then_some(true),
            });
        }

        if !decision.allows() {
            if self.profile.mode == InspectionMode::Enforce {
                return Err(InspectError::policy_blocked(decision));
            }
            warn!(reasons = ?decision.reasons(), "chat inspection verdict blocks the call");
        }
        Ok(decision)
    }
}

/// One ready-to-send inspection exchange.
struct PreparedExchange {
    /// Full endpoint URL.
    url: String,
    /// Request headers including the API key.
    headers: reqwest::header::HeaderMap,
    /// JSON request body.
    payload: Value,
}
