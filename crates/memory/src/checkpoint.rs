//! Run checkpoints.
//!
//! A checkpoint is a serialized [`RunState`] saved under a resumption key.
//! Snapshots are stored as JSON so a loaded state never aliases the one the
//! engine is still mutating.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use council_common::{CouncilError, Result, RunState};
use tokio::sync::RwLock;
use tracing::debug;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Save `state` under `key`, replacing any previous snapshot.
    async fn save(&self, key: &str, state: &RunState) -> Result<()>;

    /// Load the snapshot saved under `key`.
    async fn load(&self, key: &str) -> Result<Option<RunState>>;

    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    snapshots: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.snapshots.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, key: &str, state: &RunState) -> Result<()> {
        let snapshot = serde_json::to_value(state)
            .map_err(|e| CouncilError::Checkpoint(format!("cannot serialize run {}: {}", state.run_id, e)))?;

        debug!(
            key = %key,
            run_id = %state.run_id,
            cursor = state.cursor,
            status = ?state.status,
            "Saving checkpoint"
        );
        self.snapshots.write().await.insert(key.to_string(), snapshot);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<RunState>> {
        let snapshots = self.snapshots.read().await;
        match snapshots.get(key) {
            Some(snapshot) => serde_json::from_value(snapshot.clone())
                .map(Some)
                .map_err(|e| CouncilError::Checkpoint(format!("corrupt checkpoint {key}: {e}"))),
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.snapshots.write().await.remove(key);
        Ok(())
    }
}
