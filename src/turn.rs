//! Turn Orchestrator.
//!
//! The per-turn entry point: serialize turns per conversation, load state,
//! loop prediction → dispatch while handlers signal continuation (bounded by
//! the configured chain depth), then persist. Any infrastructure failure is
//! trapped here: the user gets a generic message plus a diagnostic trace,
//! the turn's state changes are discarded, and the process keeps serving
//! other conversations.

use crate::channel::{ChannelSender, TraceEvent};
use crate::dispatch::{Flow, HandlerRegistry};
use crate::error::AgentError;
use crate::executor::PromptExecutor;
use crate::predict::Entities;
use crate::prompts::PromptName;
use crate::state::StateStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// What the user sees when a turn fails for internal reasons.
pub const GENERIC_FAILURE_REPLY: &str =
    "I'm sorry, I encountered an error while handling that. Please try again.";

/// One inbound conversational activity, already authenticated and parsed by
/// the transport collaborator.
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// Conversation identity; state and turn serialization key off this
    pub conversation_id: String,
    /// The user's message text
    pub text: String,
    /// Channel metadata from the transport, if any
    pub channel_id: Option<String>,
    /// Correlation id for logs and trace events, unique per turn
    pub turn_id: Uuid,
}

impl TurnContext {
    pub fn new(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        TurnContext {
            conversation_id: conversation_id.into(),
            text: text.into(),
            channel_id: None,
            turn_id: Uuid::new_v4(),
        }
    }

    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }
}

pub struct TurnOrchestrator {
    executor: PromptExecutor,
    registry: Arc<HandlerRegistry>,
    store: Arc<dyn StateStore>,
    sender: ChannelSender,
    max_chain_depth: usize,
    // One lock per conversation id; held across load -> dispatch -> save so
    // concurrent turns for the same conversation cannot lose writes.
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TurnOrchestrator {
    pub fn new(
        executor: PromptExecutor,
        registry: Arc<HandlerRegistry>,
        store: Arc<dyn StateStore>,
        sender: ChannelSender,
        max_chain_depth: usize,
    ) -> Self {
        TurnOrchestrator {
            executor,
            registry,
            store,
            sender,
            max_chain_depth,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process one turn end to end. Never propagates a failure: errors are
    /// reported to the user and the trace sink, then swallowed.
    pub async fn handle_turn(&self, ctx: TurnContext) {
        let lock = self.conversation_lock(&ctx.conversation_id).await;
        let _turn = lock.lock().await;

        if let Err(err) = self.run_turn(&ctx).await {
            self.report_failure(&ctx, &err).await;
        }
    }

    async fn conversation_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn run_turn(&self, ctx: &TurnContext) -> Result<(), AgentError> {
        let mut state = self
            .store
            .load(&ctx.conversation_id)
            .await
            .map_err(AgentError::state)?
            .normalized();

        let mut entities = Entities::new();
        let mut prompt = PromptName::Primary;
        let mut rounds = 0usize;

        loop {
            if rounds >= self.max_chain_depth {
                return Err(AgentError::ChainDepthExceeded {
                    limit: self.max_chain_depth,
                });
            }
            rounds += 1;

            let result = self
                .executor
                .run_prompt(ctx, &state, prompt, &entities)
                .await?;
            entities.merge(result.entities);

            match self
                .registry
                .dispatch(&result.action, ctx, &mut state, &mut entities)
                .await?
            {
                Flow::Stop => break,
                Flow::Continue => prompt = PromptName::Primary,
                Flow::ContinueWith(next) => prompt = next,
            }
        }

        self.store
            .save(&ctx.conversation_id, &state)
            .await
            .map_err(AgentError::state)?;

        tracing::debug!(
            conversation = %ctx.conversation_id,
            turn = %ctx.turn_id,
            rounds,
            "turn complete"
        );
        Ok(())
    }

    async fn report_failure(&self, ctx: &TurnContext, err: &AgentError) {
        tracing::warn!(
            conversation = %ctx.conversation_id,
            turn = %ctx.turn_id,
            error = %err,
            "turn failed"
        );

        if let Err(send_err) = self.sender.send_activity(ctx, GENERIC_FAILURE_REPLY).await {
            tracing::error!(turn = %ctx.turn_id, error = %send_err, "failed to deliver failure reply");
        }

        let event = TraceEvent::error(err.category(), err.to_string(), ctx.turn_id);
        if let Err(trace_err) = self.sender.send_trace(ctx, &event).await {
            tracing::error!(turn = %ctx.turn_id, error = %trace_err, "failed to deliver trace event");
        }
    }
}
