//! Agent configuration.
//!
//! Loaded from a TOML file when one is given; every field has a default so
//! the agent runs without any configuration at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for the turn-processing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum prediction/dispatch rounds per turn before the turn fails
    pub max_chain_depth: usize,
    /// Deadline for one prediction-engine call, in seconds
    pub prediction_timeout_secs: u64,
    /// Deadline for one delivery-channel call, in seconds
    pub delivery_timeout_secs: u64,
    /// Prediction engine endpoint settings
    pub engine: EngineConfig,
}

/// Settings for the HTTP prediction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            max_chain_depth: 3,
            prediction_timeout_secs: 30,
            delivery_timeout_secs: 10,
            engine: EngineConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "llama3".to_string(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse configuration")
    }

    pub fn prediction_timeout(&self) -> Duration {
        Duration::from_secs(self.prediction_timeout_secs)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}
