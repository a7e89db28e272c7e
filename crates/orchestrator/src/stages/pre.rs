use async_trait::async_trait;
use chrono::Utc;
use council_common::{Result, RunState, StageName};
use serde_json::json;
use tracing::info;

use crate::pipeline::Stage;

/// Stamps request metadata into the working context and flags urgent
/// prompts.
#[derive(Debug, Default)]
pub struct PreStage;

#[async_trait]
impl Stage for PreStage {
    fn name(&self) -> StageName {
        StageName::Pre
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        let urgent = state
            .request()
            .prompt
            .trim_start()
            .to_lowercase()
            .starts_with("urgent");

        let run_id = state.run_id.clone();
        let ctx = &mut state.working_context;
        ctx.insert("request_timestamp".into(), json!(Utc::now().to_rfc3339()));
        ctx.insert("request_id".into(), json!(run_id));
        if urgent {
            ctx.insert("priority".into(), json!("high"));
        }

        info!(
            run_id = %state.run_id,
            user_id = %state.request().user_id,
            prompt = %state.request().prompt_preview(),
            urgent,
            "Request received"
        );
        Ok(())
    }
}
