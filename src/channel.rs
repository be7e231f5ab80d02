//! The message-delivery seam.
//!
//! The channel is an opaque collaborator that carries user-visible messages
//! and diagnostic trace events back to the conversation. [`ChannelSender`]
//! wraps a channel with the configured per-call deadline and error mapping,
//! and is what handlers and the orchestrator actually hold.

use crate::error::AgentError;
use crate::turn::TurnContext;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Schema URI attached to turn-failure trace events.
pub const ERROR_SCHEMA_URI: &str = "https://listkeeper.dev/schemas/turn-error";

/// A structured diagnostic event emitted on unhandled turn failure.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    /// Error category, e.g. "prediction_failure"
    pub category: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Schema URI describing the event payload
    pub value_type: String,
    /// The failing turn's correlation id
    pub turn_id: Uuid,
}

impl TraceEvent {
    pub fn error(category: impl Into<String>, message: impl Into<String>, turn_id: Uuid) -> Self {
        TraceEvent {
            category: category.into(),
            message: message.into(),
            value_type: ERROR_SCHEMA_URI.to_string(),
            turn_id,
        }
    }
}

/// External message-delivery collaborator.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Deliver a user-visible message to the conversation.
    async fn send_activity(&self, ctx: &TurnContext, text: &str) -> Result<()>;

    /// Deliver a diagnostic trace event. Best effort; callers may ignore
    /// the result.
    async fn send_trace(&self, ctx: &TurnContext, event: &TraceEvent) -> Result<()>;
}

/// Deadline-enforcing wrapper around a [`DeliveryChannel`].
#[derive(Clone)]
pub struct ChannelSender {
    channel: Arc<dyn DeliveryChannel>,
    timeout: Duration,
}

impl ChannelSender {
    pub fn new(channel: Arc<dyn DeliveryChannel>, timeout: Duration) -> Self {
        ChannelSender { channel, timeout }
    }

    pub async fn send_activity(&self, ctx: &TurnContext, text: &str) -> Result<(), AgentError> {
        match tokio::time::timeout(self.timeout, self.channel.send_activity(ctx, text)).await {
            Err(_) => Err(AgentError::Timeout {
                what: "delivery channel",
                after: self.timeout,
            }),
            Ok(Err(err)) => Err(AgentError::channel(err)),
            Ok(Ok(())) => Ok(()),
        }
    }

    pub async fn send_trace(&self, ctx: &TurnContext, event: &TraceEvent) -> Result<(), AgentError> {
        match tokio::time::timeout(self.timeout, self.channel.send_trace(ctx, event)).await {
            Err(_) => Err(AgentError::Timeout {
                what: "delivery channel",
                after: self.timeout,
            }),
            Ok(Err(err)) => Err(AgentError::channel(err)),
            Ok(Ok(())) => Ok(()),
        }
    }
}

/// Console-backed channel used by the CLI binary. Activities go to stdout,
/// trace events to the log.
pub struct ConsoleChannel;

#[async_trait]
impl DeliveryChannel for ConsoleChannel {
    async fn send_activity(&self, _ctx: &TurnContext, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }

    async fn send_trace(&self, ctx: &TurnContext, event: &TraceEvent) -> Result<()> {
        tracing::error!(
            conversation = %ctx.conversation_id,
            turn = %event.turn_id,
            category = %event.category,
            schema = %event.value_type,
            "{}",
            event.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowChannel;

    #[async_trait]
    impl DeliveryChannel for SlowChannel {
        async fn send_activity(&self, _ctx: &TurnContext, _text: &str) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }

        async fn send_trace(&self, _ctx: &TurnContext, _event: &TraceEvent) -> Result<()> {
            Ok(())
        }
    }

    struct FailingChannel;

    #[async_trait]
    impl DeliveryChannel for FailingChannel {
        async fn send_activity(&self, _ctx: &TurnContext, _text: &str) -> Result<()> {
            anyhow::bail!("socket closed")
        }

        async fn send_trace(&self, _ctx: &TurnContext, _event: &TraceEvent) -> Result<()> {
            anyhow::bail!("socket closed")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sender_enforces_deadline() {
        let sender = ChannelSender::new(Arc::new(SlowChannel), Duration::from_millis(50));
        let ctx = TurnContext::new("conv-1", "hello");
        let err = sender.send_activity(&ctx, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_sender_maps_channel_failures() {
        let sender = ChannelSender::new(Arc::new(FailingChannel), Duration::from_secs(1));
        let ctx = TurnContext::new("conv-1", "hello");
        let err = sender.send_activity(&ctx, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Channel { .. }));
        assert!(err.to_string().contains("socket closed"));
    }

    #[tokio::test]
    async fn test_sender_passes_traces_through() {
        let channel = Arc::new(crate::testing::RecordingChannel::new());
        let sender = ChannelSender::new(channel.clone(), Duration::from_secs(1));
        let ctx = TurnContext::new("conv-1", "hello");
        let event = TraceEvent::error("timeout", "engine timed out", ctx.turn_id);

        sender.send_trace(&ctx, &event).await.unwrap();
        assert_eq!(*channel.traces.lock().await, [event]);
    }
}
