//! Action registry and dispatcher.
//!
//! Maps predicted actions to handlers and interprets each handler's [`Flow`]
//! result. The registry is built once at setup and is read-only afterwards,
//! so it can be shared across concurrent turns. Reserved fallback handlers
//! catch unmatched action names and off-topic predictions; neither is an
//! error.

pub mod handlers;
pub mod replies;

pub use replies::ReplyPicker;

use crate::channel::ChannelSender;
use crate::error::AgentError;
use crate::predict::{Action, Entities};
use crate::prompts::PromptName;
use crate::state::ConversationState;
use crate::turn::TurnContext;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// What the dispatch loop should do after a handler ran.
///
/// An explicit result type instead of a bare "continue" boolean, so the
/// summarize handlers can request a specific chained prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run another prediction round with the primary prompt
    Continue,
    /// Run another prediction round with the named prompt
    ContinueWith(PromptName),
    /// End the turn's dispatch loop
    Stop,
}

impl Flow {
    pub fn continues(&self) -> bool {
        !matches!(self, Flow::Stop)
    }
}

/// A registered action handler.
///
/// Handlers mutate the turn's conversation state and entity data in place;
/// both borrows are scoped to the turn. The `action` argument carries the
/// originally predicted name, which only the unknown-action fallback needs.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(
        &self,
        action: &Action,
        ctx: &TurnContext,
        state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError>;
}

/// Immutable-after-setup mapping from action names to handlers.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
    unknown: Arc<dyn ActionHandler>,
    off_topic: Arc<dyn ActionHandler>,
}

impl HandlerRegistry {
    pub fn builder(
        unknown: Arc<dyn ActionHandler>,
        off_topic: Arc<dyn ActionHandler>,
    ) -> RegistryBuilder {
        RegistryBuilder {
            handlers: HashMap::new(),
            unknown,
            off_topic,
        }
    }

    /// The full handler set from the component design: the five list
    /// actions, `say`, and the two reserved fallbacks.
    pub fn with_default_handlers(sender: ChannelSender, picker: Arc<ReplyPicker>) -> Self {
        use self::handlers::*;

        Self::builder(
            Arc::new(UnknownActionHandler::new(sender.clone())),
            Arc::new(OffTopicHandler::new(sender.clone())),
        )
        .register("addItem", Arc::new(AddItemHandler::new(sender.clone())))
        .register(
            "removeItem",
            Arc::new(RemoveItemHandler::new(sender.clone(), picker.clone())),
        )
        .register(
            "findItem",
            Arc::new(FindItemHandler::new(sender.clone(), picker.clone())),
        )
        .register(
            "summarizeList",
            Arc::new(SummarizeListHandler::new(sender.clone())),
        )
        .register(
            "summarizeAllLists",
            Arc::new(SummarizeAllListsHandler::new(sender.clone(), picker)),
        )
        .register("say", Arc::new(SayHandler::new(sender)))
        .build()
    }

    /// Route a predicted action to its handler and run it exactly once.
    pub async fn dispatch(
        &self,
        action: &Action,
        ctx: &TurnContext,
        state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        let handler = match action {
            Action::OffTopic => &self.off_topic,
            Action::Unknown => &self.unknown,
            other => self.handlers.get(other.name()).unwrap_or(&self.unknown),
        };

        let flow = handler.handle(action, ctx, state, entities).await?;
        tracing::debug!(
            conversation = %ctx.conversation_id,
            turn = %ctx.turn_id,
            action = action.name(),
            ?flow,
            "dispatched action"
        );
        Ok(flow)
    }
}

pub struct RegistryBuilder {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
    unknown: Arc<dyn ActionHandler>,
    off_topic: Arc<dyn ActionHandler>,
}

impl RegistryBuilder {
    pub fn register(mut self, name: impl Into<String>, handler: Arc<dyn ActionHandler>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
            unknown: self.unknown,
            off_topic: self.off_topic,
        }
    }
}
