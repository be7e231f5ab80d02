//! Conversation state persistence.
//!
//! The store is keyed by conversation identity and returns owned state
//! values; the orchestrator mutates its copy during a turn and saves it back
//! at the end. Two implementations: an in-memory map and a JSON file.

pub mod lists;

pub use lists::ConversationState;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Storage collaborator for per-conversation state.
///
/// Implementations only guarantee atomicity of a single load or save; the
/// turn orchestrator serializes load→mutate→save sequences per conversation.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state for a conversation, or a fresh empty state if none
    /// has been saved yet.
    async fn load(&self, conversation_id: &str) -> Result<ConversationState>;

    /// Persist the state for a conversation.
    async fn save(&self, conversation_id: &str, state: &ConversationState) -> Result<()>;
}

/// Volatile in-memory store. State survives across turns within one process.
#[derive(Default)]
pub struct MemoryStateStore {
    data: Mutex<HashMap<String, ConversationState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, conversation_id: &str) -> Result<ConversationState> {
        let data = self.data.lock().await;
        Ok(data.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn save(&self, conversation_id: &str, state: &ConversationState) -> Result<()> {
        let mut data = self.data.lock().await;
        data.insert(conversation_id.to_string(), state.clone());
        Ok(())
    }
}

/// JSON-file-backed store mapping conversation id -> state.
pub struct FileStateStore {
    path: PathBuf,
    data: Mutex<HashMap<String, ConversationState>>,
}

impl FileStateStore {
    /// Open (or create) the store at the given path. Missing or empty files
    /// start as an empty map.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = Self::read_file(&path)?;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Default location under the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::data_dir().context("Could not find data directory")?;
        Ok(dir.join("listkeeper").join("conversations.json"))
    }

    fn read_file(path: &Path) -> Result<HashMap<String, ConversationState>> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            return Ok(HashMap::new());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).context("Failed to parse state file")
    }

    fn write_file(&self, data: &HashMap<String, ConversationState>) -> Result<()> {
        let content = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, conversation_id: &str) -> Result<ConversationState> {
        let data = self.data.lock().await;
        Ok(data.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn save(&self, conversation_id: &str, state: &ConversationState) -> Result<()> {
        let mut data = self.data.lock().await;
        data.insert(conversation_id.to_string(), state.clone());
        self.write_file(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStateStore::new();
        let mut state = ConversationState::default();
        state.items_mut("groceries").push("milk".into());

        store.save("conv-1", &state).await.unwrap();
        let loaded = store.load("conv-1").await.unwrap();
        assert_eq!(loaded, state);

        // Unknown conversations start empty
        let fresh = store.load("conv-2").await.unwrap();
        assert!(fresh.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStateStore::new(&path).unwrap();
            let mut state = ConversationState::default();
            state.items_mut("todo").push("dishes".into());
            store.save("conv-1", &state).await.unwrap();
        }

        let reopened = FileStateStore::new(&path).unwrap();
        let mut loaded = reopened.load("conv-1").await.unwrap();
        assert_eq!(loaded.items("todo"), ["dishes"]);
    }

    #[tokio::test]
    async fn test_file_store_tolerates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "  \n").unwrap();

        let store = FileStateStore::new(&path).unwrap();
        let state = store.load("conv-1").await.unwrap();
        assert!(state.is_empty());
    }
}
