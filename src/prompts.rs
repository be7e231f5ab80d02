//! Named prompt configurations.
//!
//! Each prompt the agent can run is a bundle of model parameters plus the
//! instruction text sent as the system message. The executor looks prompts
//! up by name; handlers request chained rounds by name as well.

use serde::{Deserialize, Serialize};

/// The prompts the agent knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptName {
    /// Intent extraction for an incoming user message
    Primary,
    /// Summarize a single list already loaded into entity data
    SummarizeList,
    /// Summarize every list in the conversation
    SummarizeAllLists,
}

impl PromptName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptName::Primary => "primary",
            PromptName::SummarizeList => "summarizeList",
            PromptName::SummarizeAllLists => "summarizeAllLists",
        }
    }
}

/// Model parameters and instructions for one named prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    pub instructions: String,
}

impl PromptConfig {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        PromptConfig {
            name: name.into(),
            temperature: 0.0,
            max_tokens: 256,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
            instructions: instructions.into(),
        }
    }

    /// Set temperature (clamped to 0-2)
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp.clamp(0.0, 2.0);
        self
    }

    /// Set max tokens to generate
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Set nucleus sampling cutoff
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p.clamp(0.0, 1.0);
        self
    }

    /// Set stop sequences
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// The full prompt set used by the executor.
#[derive(Debug, Clone)]
pub struct PromptSet {
    primary: PromptConfig,
    summarize_list: PromptConfig,
    summarize_all_lists: PromptConfig,
}

impl PromptSet {
    pub fn get(&self, name: PromptName) -> &PromptConfig {
        match name {
            PromptName::Primary => &self.primary,
            PromptName::SummarizeList => &self.summarize_list,
            PromptName::SummarizeAllLists => &self.summarize_all_lists,
        }
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        PromptSet {
            primary: PromptConfig::new(PromptName::Primary.as_str(), primary_instructions())
                .with_max_tokens(256)
                .with_stop(vec!["\n\n".to_string()]),
            summarize_list: PromptConfig::new(
                PromptName::SummarizeList.as_str(),
                summarize_list_instructions(),
            )
            .with_temperature(0.7)
            .with_max_tokens(512),
            summarize_all_lists: PromptConfig::new(
                PromptName::SummarizeAllLists.as_str(),
                summarize_all_lists_instructions(),
            )
            .with_temperature(0.7)
            .with_max_tokens(512),
        }
    }
}

fn primary_instructions() -> &'static str {
    r#"You are an assistant that manages named lists for the user.
Read the user's message and decide which action to take.

Available actions: addItem, removeItem, findItem, summarizeList, summarizeAllLists, say.
If the request does not match any action, use the action "unknown".
If the request has nothing to do with lists, use the action "offTopic".

Respond with a single JSON object and nothing else:
{"action": "<action>", "entities": {"list": "<list name>", "item": "<item>"}}

Only include entity fields you can extract from the message. When answering
the user directly, use {"action": "say", "entities": {"text": "<reply>"}}."#
}

fn summarize_list_instructions() -> &'static str {
    r#"You are an assistant that manages named lists for the user.
The entity data contains a list name and its items. Write a short, friendly
summary of the list for the user.

Respond with a single JSON object and nothing else:
{"action": "say", "entities": {"text": "<summary>"}}"#
}

fn summarize_all_lists_instructions() -> &'static str {
    r#"You are an assistant that manages named lists for the user.
The entity data contains every list the user keeps, with its items. Write a
short, friendly overview of all lists for the user.

Respond with a single JSON object and nothing else:
{"action": "say", "entities": {"text": "<summary>"}}"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_builder_clamps_parameters() {
        let prompt = PromptConfig::new("test", "do things")
            .with_temperature(3.0)
            .with_top_p(2.0);
        assert_eq!(prompt.temperature, 2.0);
        assert_eq!(prompt.top_p, 1.0);
    }

    #[test]
    fn test_prompt_set_lookup() {
        let prompts = PromptSet::default();
        assert_eq!(prompts.get(PromptName::Primary).name, "primary");
        assert_eq!(
            prompts.get(PromptName::SummarizeAllLists).name,
            "summarizeAllLists"
        );
        assert!(prompts
            .get(PromptName::SummarizeList)
            .instructions
            .contains("summary"));
    }
}
