//! The concrete action handlers.
//!
//! Each handler is a small struct over the channel sender (and the reply
//! picker where wording varies). Logical misses (item not on the list,
//! nothing to summarize, missing entity fields) are resolved here with a
//! message and a `Flow`, never as errors.

use super::replies::{self, ReplyPicker};
use super::{ActionHandler, Flow};
use crate::channel::ChannelSender;
use crate::error::AgentError;
use crate::predict::{Action, Entities};
use crate::prompts::PromptName;
use crate::state::ConversationState;
use crate::turn::TurnContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

const MISSING_ENTITIES_REPLY: &str =
    "I didn't catch which list and item you meant. Try something like \"add milk to my groceries list\".";
const MISSING_LIST_REPLY: &str = "I didn't catch which list you meant.";

/// Append an item to a list, creating the list on first use.
pub struct AddItemHandler {
    sender: ChannelSender,
}

impl AddItemHandler {
    pub fn new(sender: ChannelSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ActionHandler for AddItemHandler {
    async fn handle(
        &self,
        _action: &Action,
        ctx: &TurnContext,
        state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        let (Some(list), Some(item)) = (entities.list(), entities.item()) else {
            self.sender.send_activity(ctx, MISSING_ENTITIES_REPLY).await?;
            return Ok(Flow::Stop);
        };
        let (list, item) = (list.to_string(), item.to_string());
        state.items_mut(&list).push(item);
        Ok(Flow::Continue)
    }
}

/// Remove the first matching item from a list.
pub struct RemoveItemHandler {
    sender: ChannelSender,
    picker: Arc<ReplyPicker>,
}

impl RemoveItemHandler {
    pub fn new(sender: ChannelSender, picker: Arc<ReplyPicker>) -> Self {
        Self { sender, picker }
    }
}

#[async_trait]
impl ActionHandler for RemoveItemHandler {
    async fn handle(
        &self,
        _action: &Action,
        ctx: &TurnContext,
        state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        let (Some(list), Some(item)) = (entities.list(), entities.item()) else {
            self.sender.send_activity(ctx, MISSING_ENTITIES_REPLY).await?;
            return Ok(Flow::Stop);
        };
        let (list, item) = (list.to_string(), item.to_string());

        let items = state.items_mut(&list);
        match items.iter().position(|i| *i == item) {
            Some(pos) => {
                items.remove(pos);
                Ok(Flow::Continue)
            }
            None => {
                let choices = replies::item_not_found(&item, &list);
                self.sender
                    .send_activity(ctx, self.picker.pick(&choices))
                    .await?;
                Ok(Flow::Stop)
            }
        }
    }
}

/// Tell the user whether an item is on a list. Read-only; always ends the
/// chain.
pub struct FindItemHandler {
    sender: ChannelSender,
    picker: Arc<ReplyPicker>,
}

impl FindItemHandler {
    pub fn new(sender: ChannelSender, picker: Arc<ReplyPicker>) -> Self {
        Self { sender, picker }
    }
}

#[async_trait]
impl ActionHandler for FindItemHandler {
    async fn handle(
        &self,
        _action: &Action,
        ctx: &TurnContext,
        state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        let (Some(list), Some(item)) = (entities.list(), entities.item()) else {
            self.sender.send_activity(ctx, MISSING_ENTITIES_REPLY).await?;
            return Ok(Flow::Stop);
        };
        let (list, item) = (list.to_string(), item.to_string());

        let found = state.items(&list).iter().any(|i| *i == item);
        let choices = if found {
            replies::item_found(&item, &list)
        } else {
            replies::item_not_found(&item, &list)
        };
        self.sender
            .send_activity(ctx, self.picker.pick(&choices))
            .await?;
        Ok(Flow::Stop)
    }
}

/// Stash a list's items into the entity data and chain into the
/// single-list summarization prompt.
pub struct SummarizeListHandler {
    sender: ChannelSender,
}

impl SummarizeListHandler {
    pub fn new(sender: ChannelSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ActionHandler for SummarizeListHandler {
    async fn handle(
        &self,
        _action: &Action,
        ctx: &TurnContext,
        state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        let Some(list) = entities.list() else {
            self.sender.send_activity(ctx, MISSING_LIST_REPLY).await?;
            return Ok(Flow::Stop);
        };
        let list = list.to_string();
        let items = state.items(&list).to_vec();
        entities.insert("items", json!(items));
        Ok(Flow::ContinueWith(PromptName::SummarizeList))
    }
}

/// Stash every list into the entity data and chain into the all-lists
/// summarization prompt, or tell the user there is nothing to summarize.
pub struct SummarizeAllListsHandler {
    sender: ChannelSender,
    picker: Arc<ReplyPicker>,
}

impl SummarizeAllListsHandler {
    pub fn new(sender: ChannelSender, picker: Arc<ReplyPicker>) -> Self {
        Self { sender, picker }
    }
}

#[async_trait]
impl ActionHandler for SummarizeAllListsHandler {
    async fn handle(
        &self,
        _action: &Action,
        ctx: &TurnContext,
        state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        if state.is_empty() {
            let choices = replies::no_lists();
            self.sender
                .send_activity(ctx, self.picker.pick(&choices))
                .await?;
            return Ok(Flow::Stop);
        }

        let mut all = serde_json::Map::new();
        for name in &state.list_names {
            let items = state.lists.get(name).cloned().unwrap_or_default();
            all.insert(name.clone(), json!(items));
        }
        entities.insert("lists", Value::Object(all));
        Ok(Flow::ContinueWith(PromptName::SummarizeAllLists))
    }
}

/// Deliver model-authored text from the `text` entity.
pub struct SayHandler {
    sender: ChannelSender,
}

impl SayHandler {
    pub fn new(sender: ChannelSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ActionHandler for SayHandler {
    async fn handle(
        &self,
        _action: &Action,
        ctx: &TurnContext,
        _state: &mut ConversationState,
        entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        match entities.text() {
            Some(text) if !text.trim().is_empty() => {
                self.sender.send_activity(ctx, text).await?;
            }
            _ => {
                tracing::warn!(turn = %ctx.turn_id, "say action carried no text entity");
            }
        }
        Ok(Flow::Stop)
    }
}

/// Reserved fallback for action names with no registered handler.
pub struct UnknownActionHandler {
    sender: ChannelSender,
}

impl UnknownActionHandler {
    pub fn new(sender: ChannelSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ActionHandler for UnknownActionHandler {
    async fn handle(
        &self,
        action: &Action,
        ctx: &TurnContext,
        _state: &mut ConversationState,
        _entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        let reply = match action {
            Action::Other(name) => format!("I'm sorry, I don't know how to {name}."),
            _ => "I'm not sure what you'd like me to do with your lists.".to_string(),
        };
        self.sender.send_activity(ctx, &reply).await?;
        Ok(Flow::Stop)
    }
}

/// Reserved fallback for off-topic predictions.
pub struct OffTopicHandler {
    sender: ChannelSender,
}

impl OffTopicHandler {
    pub fn new(sender: ChannelSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ActionHandler for OffTopicHandler {
    async fn handle(
        &self,
        _action: &Action,
        ctx: &TurnContext,
        _state: &mut ConversationState,
        _entities: &mut Entities,
    ) -> Result<Flow, AgentError> {
        self.sender
            .send_activity(ctx, "I'm sorry, I can only help with keeping your lists.")
            .await?;
        Ok(Flow::Stop)
    }
}
