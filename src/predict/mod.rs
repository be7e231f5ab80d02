//! The prediction-engine seam.
//!
//! The engine is an opaque collaborator: given a prompt configuration and
//! the turn's context it returns a predicted action name plus extracted
//! entity data. Everything downstream works on the parsed [`Action`] and
//! [`Entities`] types defined here.

pub mod http;

pub use http::HttpPredictionEngine;

use crate::prompts::PromptConfig;
use crate::state::ConversationState;
use crate::turn::TurnContext;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Reserved action name: the model recognized no action.
pub const UNKNOWN_ACTION: &str = "unknown";
/// Reserved action name: the request is unrelated to list keeping.
pub const OFF_TOPIC_ACTION: &str = "offTopic";

/// A predicted action, parsed from the engine's wire-level action name.
///
/// The set is open: names without a registered handler parse to `Other` and
/// route to the unknown-action fallback at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    AddItem,
    RemoveItem,
    FindItem,
    SummarizeList,
    SummarizeAllLists,
    /// Deliver model-authored text to the user
    Say,
    /// Reserved sentinel: no recognized action
    Unknown,
    /// Reserved sentinel: off-topic request
    OffTopic,
    /// Any other action name the model produced
    Other(String),
}

impl Action {
    pub fn parse(name: &str) -> Action {
        match name.trim() {
            "addItem" => Action::AddItem,
            "removeItem" => Action::RemoveItem,
            "findItem" => Action::FindItem,
            "summarizeList" => Action::SummarizeList,
            "summarizeAllLists" => Action::SummarizeAllLists,
            "say" => Action::Say,
            UNKNOWN_ACTION | "" => Action::Unknown,
            OFF_TOPIC_ACTION => Action::OffTopic,
            other => Action::Other(other.to_string()),
        }
    }

    /// The wire-level name of this action.
    pub fn name(&self) -> &str {
        match self {
            Action::AddItem => "addItem",
            Action::RemoveItem => "removeItem",
            Action::FindItem => "findItem",
            Action::SummarizeList => "summarizeList",
            Action::SummarizeAllLists => "summarizeAllLists",
            Action::Say => "say",
            Action::Unknown => UNKNOWN_ACTION,
            Action::OffTopic => OFF_TOPIC_ACTION,
            Action::Other(name) => name,
        }
    }
}

/// Entity data extracted by the engine from free text.
///
/// Any field may be missing or partially populated; handlers must tolerate
/// that. Handlers may also stash auxiliary data here for a chained round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entities {
    fields: HashMap<String, Value>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// The `list` entity, if the engine extracted one.
    pub fn list(&self) -> Option<&str> {
        self.get_str("list")
    }

    /// The `item` entity, if the engine extracted one.
    pub fn item(&self) -> Option<&str> {
        self.get_str("item")
    }

    /// The `text` entity carried by `say` predictions.
    pub fn text(&self) -> Option<&str> {
        self.get_str("text")
    }

    /// Overlay another entity map on top of this one. Later rounds win on
    /// conflicting keys; handler-stashed keys survive when the new round
    /// does not mention them.
    pub fn merge(&mut self, other: Entities) {
        self.fields.extend(other.fields);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Entities {
    fn from(pairs: [(&str, Value); N]) -> Self {
        let mut entities = Entities::new();
        for (key, value) in pairs {
            entities.insert(key, value);
        }
        entities
    }
}

/// One prediction round's outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub action: Action,
    pub entities: Entities,
}

/// External natural-language prediction service.
#[async_trait]
pub trait PredictionEngine: Send + Sync {
    /// Run one prediction against the given prompt configuration and turn
    /// context. Implementations own the transport; they return plain
    /// `anyhow` errors which the executor classifies.
    async fn predict(
        &self,
        prompt: &PromptConfig,
        ctx: &TurnContext,
        state: &ConversationState,
        entities: &Entities,
    ) -> Result<PredictionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_parse_known_names() {
        assert_eq!(Action::parse("addItem"), Action::AddItem);
        assert_eq!(Action::parse(" removeItem "), Action::RemoveItem);
        assert_eq!(Action::parse("summarizeAllLists"), Action::SummarizeAllLists);
        assert_eq!(Action::parse("say"), Action::Say);
    }

    #[test]
    fn test_action_parse_sentinels() {
        assert_eq!(Action::parse("unknown"), Action::Unknown);
        assert_eq!(Action::parse(""), Action::Unknown);
        assert_eq!(Action::parse("offTopic"), Action::OffTopic);
    }

    #[test]
    fn test_action_parse_open_set() {
        let action = Action::parse("orderPizza");
        assert_eq!(action, Action::Other("orderPizza".to_string()));
        assert_eq!(action.name(), "orderPizza");
    }

    #[test]
    fn test_entities_tolerate_missing_fields() {
        let entities = Entities::new();
        assert!(entities.list().is_none());
        assert!(entities.item().is_none());

        let entities = Entities::from([("list", json!("groceries"))]);
        assert_eq!(entities.list(), Some("groceries"));
        assert!(entities.item().is_none());
    }

    #[test]
    fn test_entities_merge_prefers_newer_values() {
        let mut entities = Entities::from([
            ("list", json!("groceries")),
            ("items", json!(["milk", "eggs"])),
        ]);
        entities.merge(Entities::from([("list", json!("chores"))]));

        assert_eq!(entities.list(), Some("chores"));
        // Stashed auxiliary data survives the merge
        assert_eq!(entities.get("items"), Some(&json!(["milk", "eggs"])));
    }

    #[test]
    fn test_entities_deserialize_from_wire_map() {
        let entities: Entities =
            serde_json::from_str(r#"{"list": "groceries", "item": "milk"}"#).unwrap();
        assert_eq!(entities.list(), Some("groceries"));
        assert_eq!(entities.item(), Some("milk"));
    }
}
