//! Shared-context stages: read at the start of the run, written near the end.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use council_common::{ContextEntry, Result, RunState, StageName};
use council_memory::ContextStore;
use serde_json::json;
use tracing::{debug, info};

use crate::pipeline::Stage;

pub struct EnrichContextStage {
    store: Arc<dyn ContextStore>,
}

impl EnrichContextStage {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Stage for EnrichContextStage {
    fn name(&self) -> StageName {
        StageName::EnrichContext
    }

    /// Loads the (user, session) entry, or starts one, and records this
    /// interaction on it. The store is not written until update-context.
    async fn run(&self, state: &mut RunState) -> Result<()> {
        let request = state.request();
        let (user_id, session_id) = (request.user_id.clone(), request.session_id.clone());

        let mut entry = match self.store.get(&user_id, &session_id).await? {
            Some(entry) => entry,
            None => {
                debug!(user_id = %user_id, session_id = %session_id, "No stored context, starting fresh");
                ContextEntry::new(&user_id, &session_id)
            }
        };
        entry.record_interaction(
            state.request().prompt.clone(),
            state.request().scope.clone(),
            Utc::now(),
        );

        info!(
            user_id = %user_id,
            session_id = %session_id,
            interaction_count = entry.interaction_count,
            "Context enriched"
        );

        state.working_context.insert(
            "user_context".into(),
            json!({
                "interaction_count": entry.interaction_count,
                "user_id": user_id,
                "session_id": session_id,
            }),
        );
        state.session_context = Some(entry);
        Ok(())
    }
}

pub struct UpdateContextStage {
    store: Arc<dyn ContextStore>,
}

impl UpdateContextStage {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Stage for UpdateContextStage {
    fn name(&self) -> StageName {
        StageName::UpdateContext
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        let request = state.request();
        let (user_id, session_id) = (request.user_id.clone(), request.session_id.clone());

        let mut entry = state
            .session_context
            .take()
            .unwrap_or_else(|| ContextEntry::new(&user_id, &session_id));
        entry.record_response(state.summary.clone(), Utc::now());

        self.store.put(&user_id, &session_id, entry.clone()).await?;
        debug!(user_id = %user_id, session_id = %session_id, "Context stored");

        state.session_context = Some(entry);
        Ok(())
    }
}
