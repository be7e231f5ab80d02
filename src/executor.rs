//! Prompt Chain Executor.
//!
//! Runs one prediction against a named prompt configuration. Stateless
//! between invocations: chaining is entirely the orchestrator's reaction to
//! handler flow signals. Engine failures and deadline misses surface as
//! distinguishable errors; there is no retry here.

use crate::error::AgentError;
use crate::predict::{Entities, PredictionEngine, PredictionResult};
use crate::prompts::{PromptName, PromptSet};
use crate::state::ConversationState;
use crate::turn::TurnContext;
use std::sync::Arc;
use std::time::Duration;

pub struct PromptExecutor {
    engine: Arc<dyn PredictionEngine>,
    prompts: PromptSet,
    timeout: Duration,
}

impl PromptExecutor {
    pub fn new(engine: Arc<dyn PredictionEngine>, prompts: PromptSet, timeout: Duration) -> Self {
        PromptExecutor {
            engine,
            prompts,
            timeout,
        }
    }

    /// Run a single prediction round with the named prompt.
    pub async fn run_prompt(
        &self,
        ctx: &TurnContext,
        state: &ConversationState,
        name: PromptName,
        entities: &Entities,
    ) -> Result<PredictionResult, AgentError> {
        let prompt = self.prompts.get(name);

        // Best-effort request log for diagnostics
        tracing::debug!(
            conversation = %ctx.conversation_id,
            turn = %ctx.turn_id,
            prompt = prompt.name.as_str(),
            temperature = prompt.temperature,
            "running prompt"
        );

        let prediction = tokio::time::timeout(
            self.timeout,
            self.engine.predict(prompt, ctx, state, entities),
        )
        .await;

        match prediction {
            Err(_) => Err(AgentError::Timeout {
                what: "prediction engine",
                after: self.timeout,
            }),
            Ok(Err(err)) => Err(AgentError::prediction(err)),
            Ok(Ok(result)) => {
                tracing::debug!(
                    turn = %ctx.turn_id,
                    action = result.action.name(),
                    "prediction complete"
                );
                Ok(result)
            }
        }
    }
}
