//! Structured error types for listkeeper
//!
//! Covers the failure modes a turn can hit: the prediction engine, the
//! delivery channel, the state store, timeouts on either collaborator, and
//! the chain-depth bound on prompt chaining.

use std::time::Duration;
use thiserror::Error;

/// Primary error type for turn processing.
///
/// Logical outcomes (item not found, unknown action, off-topic input) are
/// never errors; they are handled inside the dispatch layer. Everything here
/// is an infrastructure failure that aborts the turn.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Prediction engine unreachable or returned a malformed result
    #[error("prediction failed: {message}")]
    Prediction { message: String },

    /// Prompt chaining exceeded the configured maximum rounds
    #[error("chain depth exceeded ({limit} rounds)")]
    ChainDepthExceeded { limit: usize },

    /// An external call did not complete within its deadline
    #[error("{what} timed out after {after:?}")]
    Timeout { what: &'static str, after: Duration },

    /// Delivery channel failed to accept an outgoing message
    #[error("delivery failed: {message}")]
    Channel { message: String },

    /// State store failed to load or persist conversation state
    #[error("state store failed: {message}")]
    State { message: String },
}

impl AgentError {
    /// Wrap a prediction-engine failure, keeping the full anyhow chain.
    pub fn prediction(err: anyhow::Error) -> Self {
        AgentError::Prediction {
            message: format!("{err:#}"),
        }
    }

    /// Wrap a delivery-channel failure.
    pub fn channel(err: anyhow::Error) -> Self {
        AgentError::Channel {
            message: format!("{err:#}"),
        }
    }

    /// Wrap a state-store failure.
    pub fn state(err: anyhow::Error) -> Self {
        AgentError::State {
            message: format!("{err:#}"),
        }
    }

    /// Short category label used in diagnostic trace events.
    pub fn category(&self) -> &'static str {
        match self {
            AgentError::Prediction { .. } => "prediction_failure",
            AgentError::ChainDepthExceeded { .. } => "chain_depth_exceeded",
            AgentError::Timeout { .. } => "timeout",
            AgentError::Channel { .. } => "channel_failure",
            AgentError::State { .. } => "state_failure",
        }
    }
}
