//! HTTP-backed prediction engine.
//!
//! Talks to any OpenAI-compatible chat-completions endpoint. The prompt
//! configuration supplies the model parameters, the turn context and entity
//! data are rendered into the messages, and the model's reply is expected to
//! be a single JSON object `{"action": ..., "entities": {...}}`.

use super::{Action, Entities, PredictionEngine, PredictionResult};
use crate::config::EngineConfig;
use crate::prompts::PromptConfig;
use crate::state::ConversationState;
use crate::turn::TurnContext;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Client as HttpClient, StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct HttpPredictionEngine {
    config: EngineConfig,
    http_client: HttpClient,
}

impl HttpPredictionEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpPredictionEngine {
            config,
            http_client,
        })
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse()?);
        if let Some(api_key) = &self.config.api_key {
            if !api_key.is_empty() {
                headers.insert("Authorization", format!("Bearer {}", api_key).parse()?);
            }
        }
        Ok(headers)
    }

    /// Render the system message: instructions plus the data the model needs
    /// to ground its prediction (current lists, accumulated entity data).
    fn render_system_message(
        prompt: &PromptConfig,
        state: &ConversationState,
        entities: &Entities,
    ) -> String {
        let mut message = prompt.instructions.to_string();

        if !state.is_empty() {
            message.push_str("\n\nThe user's current lists:\n");
            for name in &state.list_names {
                let items = state.lists.get(name).map(Vec::as_slice).unwrap_or(&[]);
                message.push_str(&format!("- {}: [{}]\n", name, items.join(", ")));
            }
        }

        if !entities.is_empty() {
            let data = serde_json::to_string(entities).unwrap_or_default();
            message.push_str(&format!("\nEntity data:\n{}\n", data));
        }

        message
    }
}

#[async_trait]
impl PredictionEngine for HttpPredictionEngine {
    async fn predict(
        &self,
        prompt: &PromptConfig,
        ctx: &TurnContext,
        state: &ConversationState,
        entities: &Entities,
    ) -> Result<PredictionResult> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let body = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                WireMessage {
                    role: "system",
                    content: Self::render_system_message(prompt, state, entities),
                },
                WireMessage {
                    role: "user",
                    content: ctx.text.clone(),
                },
            ],
            max_tokens: prompt.max_tokens,
            temperature: prompt.temperature,
            top_p: prompt.top_p,
            frequency_penalty: prompt.frequency_penalty,
            presence_penalty: prompt.presence_penalty,
            stop: prompt.stop.clone(),
        };

        let response = self
            .http_client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to prediction endpoint")?;

        match response.status() {
            StatusCode::OK => {
                let response_body: CompletionResponse = response
                    .json()
                    .await
                    .context("Failed to parse completion response")?;
                let content = response_body
                    .choices
                    .first()
                    .map(|c| c.message.content.as_str())
                    .unwrap_or_default();
                parse_prediction(content)
            }
            StatusCode::UNAUTHORIZED => {
                bail!("Authentication failed. Check your API key.");
            }
            StatusCode::TOO_MANY_REQUESTS => {
                bail!("Rate limit exceeded. Please try again later.");
            }
            status => {
                let error_body: Option<Value> = response.json().await.ok();
                let error_msg = error_body
                    .as_ref()
                    .and_then(|v| v.get("error").and_then(|e| e.get("message")))
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown error");
                bail!("Prediction request failed ({}): {}", status, error_msg);
            }
        }
    }
}

/// Parse the model's reply into a prediction. Tolerates a fenced code block
/// around the JSON but nothing else.
fn parse_prediction(content: &str) -> Result<PredictionResult> {
    let trimmed = strip_code_fence(content.trim());
    if trimmed.is_empty() {
        bail!("Prediction engine returned an empty completion");
    }

    let wire: WirePrediction = serde_json::from_str(trimmed)
        .with_context(|| format!("Malformed prediction output: {}", truncate(trimmed, 120)))?;

    Ok(PredictionResult {
        action: Action::parse(&wire.action),
        entities: wire.entities,
    })
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches('\n')
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Deserialize)]
struct WirePrediction {
    #[serde(default)]
    action: String,
    #[serde(default)]
    entities: Entities,
}
