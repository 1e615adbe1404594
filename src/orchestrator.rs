//! Chat orchestrator: runs every incoming message through the pipeline.
//!
//! ```text
//! track activity → append user msg → plan → tools → reply → append reply → epistemic update
//! ```
//!
//! Conversation buffers live in a [`SessionStore`]; planning, tool dispatch
//! and reply generation are pluggable through the [`crate::pipeline`] traits.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Config, OrchestratorConfig};
use crate::error::Result;
use crate::mode::Mode;
use crate::pipeline::{
    EchoResponder, NoopToolDispatcher, Planner, Responder, StaticPlanner, ToolDispatcher,
};
use crate::self_model::{EpistemicSnapshot, LightweightSnapshot, Metadata, SelfModel};
use crate::session::{InMemorySessionStore, Message, Role, SessionStore};

/// Inbound chat message as a transport layer hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub user_id: String,
    pub text: String,
    /// Raw mode name; validated against the self-model's capabilities.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Response envelope returned for every handled message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub mode: Mode,
    pub epistemic: EpistemicSnapshot,
    pub self_state: LightweightSnapshot,
}

/// High-level coordinator for Machine Spirit.
///
/// Not internally synchronized; wrap it in a mutex if several tasks share it.
pub struct Orchestrator {
    self_model: SelfModel,
    config: OrchestratorConfig,
    store: Box<dyn SessionStore>,
    planner: Box<dyn Planner>,
    tools: Box<dyn ToolDispatcher>,
    responder: Box<dyn Responder>,
}

impl Orchestrator {
    /// Create an orchestrator with the in-memory store and placeholder pipeline.
    pub fn new(self_model: SelfModel, config: OrchestratorConfig) -> Self {
        Self::with_components(
            self_model,
            config,
            Box::new(InMemorySessionStore::new()),
            Box::new(StaticPlanner),
            Box::new(NoopToolDispatcher),
            Box::new(EchoResponder),
        )
    }

    pub fn with_components(
        self_model: SelfModel,
        config: OrchestratorConfig,
        store: Box<dyn SessionStore>,
        planner: Box<dyn Planner>,
        tools: Box<dyn ToolDispatcher>,
        responder: Box<dyn Responder>,
    ) -> Self {
        Self {
            self_model,
            config,
            store,
            planner,
            tools,
            responder,
        }
    }

    /// Build from a loaded config file, applying identity overrides.
    pub fn from_config(config: &Config) -> Self {
        let mut self_model = SelfModel::new();
        self_model.identity = config.identity();
        Self::new(self_model, config.orchestrator.clone())
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn self_model(&self) -> &SelfModel {
        &self.self_model
    }

    pub fn self_model_mut(&mut self) -> &mut SelfModel {
        &mut self.self_model
    }

    /// Main chat entry point.
    pub fn handle_message(
        &mut self,
        session_id: &str,
        user_id: &str,
        text: &str,
        mode: Option<Mode>,
        metadata: Option<Metadata>,
    ) -> ChatResponse {
        let mode = mode.unwrap_or(self.config.default_mode);
        debug!(session_id, user_id, mode = %mode, "handling message");

        self.self_model.track_activity(user_id, session_id);
        self.self_model.set_current_mode(mode);

        self.append_message(
            session_id,
            Message::new(Role::User, text, metadata.unwrap_or_default()),
        );

        let plan = self.planner.draft(text, mode, session_id);
        let mut plan_meta = Metadata::new();
        plan_meta.insert("session_id".to_string(), Value::from(session_id));
        self.self_model.log_event(
            "plan_drafted",
            format!("Drafted simple plan with mode={}", mode),
            Some(plan_meta),
        );

        let tool_results = self.tools.dispatch(&plan, session_id);
        debug!(session_id, steps = plan.steps.len(), tools = tool_results.len(), "plan executed");

        let draft = self
            .responder
            .respond(text, &plan, &tool_results, mode, session_id);

        let mut reply_meta = Metadata::new();
        reply_meta.insert("mode".to_string(), Value::from(mode.as_str()));
        self.append_message(
            session_id,
            Message::new(Role::Assistant, draft.reply.clone(), reply_meta),
        );

        self.self_model.update_epistemic_state(draft.epistemic.clone());

        ChatResponse {
            reply: draft.reply,
            mode,
            epistemic: draft.epistemic,
            self_state: self.self_model.lightweight_snapshot(),
        }
    }

    /// Boundary entry point: validates the raw mode before touching any state.
    /// An empty mode string falls back to the configured default.
    pub fn handle_request(&mut self, request: ChatRequest) -> Result<ChatResponse> {
        let mode = request
            .mode
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| self.self_model.validate_mode(raw))
            .transpose()?;
        Ok(self.handle_message(
            &request.session_id,
            &request.user_id,
            &request.text,
            mode,
            request.metadata,
        ))
    }

    /// Copy of a session's history. Empty for unknown sessions.
    pub fn get_conversation_history(&self, session_id: &str) -> Vec<Message> {
        self.store.get(session_id)
    }

    /// Drop a session's buffer. Unknown sessions are ignored.
    pub fn clear_conversation_history(&mut self, session_id: &str) {
        if self.store.remove(session_id) {
            info!(
                session_id,
                remaining_sessions = self.store.session_count(),
                "conversation history cleared"
            );
        }
    }

    fn append_message(&mut self, session_id: &str, message: Message) {
        self.store.append(session_id, message);
        let evicted = self
            .store
            .evict_to(session_id, self.config.max_history_messages);
        if evicted > 0 {
            debug!(session_id, evicted, "history trimmed");
        }
    }
}
