//! Shared per-(user, session) context.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use council_common::{ContextEntry, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// Keyed storage for [`ContextEntry`] values. Reads and writes for one key
/// are never torn: `get` returns a whole entry as last written by `put`.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn get(&self, user_id: &str, session_id: &str) -> Result<Option<ContextEntry>>;

    /// Replace the entry for (`user_id`, `session_id`).
    async fn put(&self, user_id: &str, session_id: &str, entry: ContextEntry) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryContextStore {
    entries: Arc<RwLock<HashMap<(String, String), ContextEntry>>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get(&self, user_id: &str, session_id: &str) -> Result<Option<ContextEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(user_id.to_string(), session_id.to_string()))
            .cloned())
    }

    async fn put(&self, user_id: &str, session_id: &str, entry: ContextEntry) -> Result<()> {
        debug!(
            user_id = %user_id,
            session_id = %session_id,
            interaction_count = entry.interaction_count,
            "Storing context"
        );
        self.entries
            .write()
            .await
            .insert((user_id.to_string(), session_id.to_string()), entry);
        Ok(())
    }
}
