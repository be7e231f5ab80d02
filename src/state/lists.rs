//! The named-list model inside a conversation's state.
//!
//! A conversation owns an ordered set of named lists. `list_names` records
//! creation order and `lists` holds the items; the two must stay in lockstep
//! (every key appears exactly once in `list_names` and vice versa). Broken
//! state coming back from storage is repaired, not rejected.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-conversation structured state: the named lists and their items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// List names in creation order, no duplicates
    #[serde(default)]
    pub list_names: Vec<String>,
    /// List name -> items; key set mirrors `list_names`
    #[serde(default)]
    pub lists: HashMap<String, Vec<String>>,
}

impl ConversationState {
    /// Normalize state loaded from storage. Anything that breaks the
    /// `list_names`/`lists` bijection gets a full reset rather than a
    /// partial patch-up.
    pub fn normalized(mut self) -> Self {
        if !self.is_consistent() {
            self.list_names.clear();
            self.lists.clear();
        }
        self
    }

    fn is_consistent(&self) -> bool {
        let names: HashSet<&str> = self.list_names.iter().map(String::as_str).collect();
        if names.len() != self.list_names.len() {
            return false;
        }
        if names.len() != self.lists.len() {
            return false;
        }
        self.lists.keys().all(|k| names.contains(k.as_str()))
    }

    /// Create the named list if it does not exist yet. Idempotent.
    pub fn ensure_list(&mut self, name: &str) {
        if !self.lists.contains_key(name) {
            self.list_names.push(name.to_string());
            self.lists.insert(name.to_string(), Vec::new());
        }
    }

    /// Current items of the named list, creating it empty if absent.
    pub fn items(&mut self, name: &str) -> &[String] {
        self.ensure_list(name);
        self.lists.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable access to the named list's items, creating it if absent.
    pub fn items_mut(&mut self, name: &str) -> &mut Vec<String> {
        self.ensure_list(name);
        self.lists.get_mut(name).unwrap()
    }

    /// Replace the named list's contents. `None` is normalized to empty.
    pub fn set_items(&mut self, name: &str, items: Option<Vec<String>>) {
        self.ensure_list(name);
        self.lists.insert(name.to_string(), items.unwrap_or_default());
    }

    /// True when the conversation has no lists at all.
    pub fn is_empty(&self) -> bool {
        self.list_names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_list_is_idempotent() {
        let mut once = ConversationState::default();
        once.ensure_list("groceries");

        let mut twice = ConversationState::default();
        twice.ensure_list("groceries");
        twice.ensure_list("groceries");

        assert_eq!(once, twice);
        assert_eq!(twice.list_names, vec!["groceries"]);
    }

    #[test]
    fn test_items_creates_absent_list() {
        let mut state = ConversationState::default();
        assert!(state.items("todo").is_empty());
        assert_eq!(state.list_names, vec!["todo"]);
        assert!(state.lists.contains_key("todo"));
    }

    #[test]
    fn test_set_items_normalizes_none() {
        let mut state = ConversationState::default();
        state.set_items("todo", Some(vec!["a".into(), "b".into()]));
        assert_eq!(state.items("todo"), ["a", "b"]);

        state.set_items("todo", None);
        assert!(state.items("todo").is_empty());
    }

    #[test]
    fn test_names_and_keys_stay_in_lockstep() {
        let mut state = ConversationState::default();
        state.items_mut("groceries").push("milk".into());
        state.set_items("chores", Some(vec!["dishes".into()]));
        state.ensure_list("groceries");

        let mut names = state.list_names.clone();
        names.sort();
        let mut keys: Vec<String> = state.lists.keys().cloned().collect();
        keys.sort();
        assert_eq!(names, keys);
        assert_eq!(state.list_names.len(), 2);
    }

    #[test]
    fn test_normalized_repairs_duplicate_names() {
        let broken = ConversationState {
            list_names: vec!["a".into(), "a".into()],
            lists: HashMap::from([("a".to_string(), vec!["x".to_string()])]),
        };
        let repaired = broken.normalized();
        assert!(repaired.is_empty());
        assert!(repaired.lists.is_empty());
    }

    #[test]
    fn test_normalized_repairs_key_mismatch() {
        let broken = ConversationState {
            list_names: vec!["a".into()],
            lists: HashMap::from([("b".to_string(), Vec::new())]),
        };
        let repaired = broken.normalized();
        assert!(repaired.is_empty());
    }

    #[test]
    fn test_normalized_keeps_consistent_state() {
        let mut state = ConversationState::default();
        state.items_mut("groceries").push("milk".into());
        let normalized = state.clone().normalized();
        assert_eq!(state, normalized);
    }
}
