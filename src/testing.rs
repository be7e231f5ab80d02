//! Shared test doubles for the collaborator seams.

use crate::channel::{DeliveryChannel, TraceEvent};
use crate::predict::{Entities, PredictionEngine, PredictionResult};
use crate::prompts::PromptConfig;
use crate::state::ConversationState;
use crate::turn::TurnContext;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Records delivered activities and traces for assertions.
pub(crate) struct RecordingChannel {
    pub activities: Mutex<Vec<String>>,
    pub traces: Mutex<Vec<TraceEvent>>,
}

impl RecordingChannel {
    pub(crate) fn new() -> Self {
        RecordingChannel {
            activities: Mutex::new(Vec::new()),
            traces: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn send_activity(&self, _ctx: &TurnContext, text: &str) -> Result<()> {
        self.activities.lock().await.push(text.to_string());
        Ok(())
    }

    async fn send_trace(&self, _ctx: &TurnContext, event: &TraceEvent) -> Result<()> {
        self.traces.lock().await.push(event.clone());
        Ok(())
    }
}

/// One scripted engine response.
pub(crate) enum ScriptedResponse {
    Predict(PredictionResult),
    Fail(String),
}

/// Prediction engine that replays a fixed script of responses, recording the
/// prompt name used for each call.
pub(crate) struct ScriptedEngine {
    script: Mutex<Vec<ScriptedResponse>>,
    pub calls: Mutex<Vec<String>>,
    pub entities_seen: Mutex<Vec<Entities>>,
}

impl ScriptedEngine {
    pub(crate) fn new(script: Vec<ScriptedResponse>) -> Self {
        let mut script = script;
        script.reverse();
        ScriptedEngine {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
            entities_seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn predicting(results: Vec<PredictionResult>) -> Self {
        Self::new(results.into_iter().map(ScriptedResponse::Predict).collect())
    }

    pub(crate) async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl PredictionEngine for ScriptedEngine {
    async fn predict(
        &self,
        prompt: &PromptConfig,
        _ctx: &TurnContext,
        _state: &ConversationState,
        entities: &Entities,
    ) -> Result<PredictionResult> {
        self.calls.lock().await.push(prompt.name.clone());
        self.entities_seen.lock().await.push(entities.clone());
        match self.script.lock().await.pop() {
            Some(ScriptedResponse::Predict(result)) => Ok(result),
            Some(ScriptedResponse::Fail(message)) => anyhow::bail!(message),
            None => anyhow::bail!("scripted engine exhausted"),
        }
    }
}
