//! `listkeeper` - a conversational list-keeping agent
//!
//! Reads one message per line from stdin, runs each as a conversational
//! turn against the configured prediction endpoint, and prints the agent's
//! replies. Conversation state persists across runs in a JSON file.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use listkeeper::{
    AgentConfig, ChannelSender, ConsoleChannel, FileStateStore, HandlerRegistry,
    HttpPredictionEngine, PromptExecutor, PromptSet, ReplyPicker, TurnContext, TurnOrchestrator,
};

#[derive(Parser)]
#[command(name = "listkeeper", version, about = "Keep named lists through conversation")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Conversation identity to run turns under
    #[arg(long, default_value = "local")]
    conversation: String,

    /// Where to persist conversation state (defaults to the platform data dir)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Seed for reply-phrase selection (useful for reproducible sessions)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "listkeeper=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AgentConfig::load(path).context("Failed to load configuration")?,
        None => AgentConfig::default(),
    };

    let state_path = match cli.state_file {
        Some(path) => path,
        None => FileStateStore::default_path()?,
    };
    let store = Arc::new(FileStateStore::new(state_path)?);

    let engine = Arc::new(HttpPredictionEngine::new(config.engine.clone())?);
    let executor = PromptExecutor::new(engine, PromptSet::default(), config.prediction_timeout());

    let sender = ChannelSender::new(Arc::new(ConsoleChannel), config.delivery_timeout());
    let picker = match cli.seed {
        Some(seed) => ReplyPicker::seeded(seed),
        None => ReplyPicker::new(),
    };
    let registry = Arc::new(HandlerRegistry::with_default_handlers(
        sender.clone(),
        Arc::new(picker),
    ));

    let orchestrator = TurnOrchestrator::new(
        executor,
        registry,
        store,
        sender,
        config.max_chain_depth,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        orchestrator
            .handle_turn(TurnContext::new(cli.conversation.clone(), text))
            .await;
    }

    Ok(())
}
