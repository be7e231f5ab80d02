pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod predict;
pub mod prompts;
pub mod state;
pub mod turn;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use channel::{ChannelSender, ConsoleChannel, DeliveryChannel, TraceEvent};
pub use config::AgentConfig;
pub use dispatch::{ActionHandler, Flow, HandlerRegistry, ReplyPicker};
pub use error::AgentError;
pub use executor::PromptExecutor;
pub use predict::{Action, Entities, HttpPredictionEngine, PredictionEngine, PredictionResult};
pub use prompts::{PromptConfig, PromptName, PromptSet};
pub use state::{ConversationState, FileStateStore, MemoryStateStore, StateStore};
pub use turn::{TurnContext, TurnOrchestrator};
