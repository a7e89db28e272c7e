use async_trait::async_trait;
use chrono::Utc;
use council_common::{
    FormattedResponse, ResponseMetadata, Result, RunState, SpecialistInsight, StageName,
};
use serde_json::json;
use tracing::{info, warn};

use crate::pipeline::Stage;

/// Builds the caller-facing response from the run state.
#[derive(Debug, Default)]
pub struct FormatResponseStage;

#[async_trait]
impl Stage for FormatResponseStage {
    fn name(&self) -> StageName {
        StageName::FormatResponse
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        let specialist_insights = state
            .specialist_results
            .completed()
            .map(|o| {
                (
                    o.name.clone(),
                    SpecialistInsight {
                        content: o.content.clone(),
                        duration_seconds: o.duration_seconds,
                    },
                )
            })
            .collect();

        let specialists = state
            .specialist_results
            .iter()
            .map(|o| (o.name.clone(), o.status))
            .collect();

        state.formatted_response = Some(FormattedResponse {
            run_id: state.run_id.clone(),
            status: "success".into(),
            summary: state.summary.clone(),
            followups: state.followups.clone(),
            specialist_insights,
            metadata: ResponseMetadata {
                processing_time: state.elapsed_seconds(),
                language: state.flags.target_language.clone(),
                translated: state.flags.needs_translation,
                steps: state.step_log.iter().map(|s| s.step.clone()).collect(),
                specialists,
                completion_time: None,
            },
        });
        Ok(())
    }
}

/// Stamps completion metadata.
#[derive(Debug, Default)]
pub struct PostStage;

#[async_trait]
impl Stage for PostStage {
    fn name(&self) -> StageName {
        StageName::Post
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        let now = Utc::now();
        let duration = state.elapsed_seconds();

        state
            .working_context
            .insert("completion_timestamp".into(), json!(now.to_rfc3339()));
        state
            .working_context
            .insert("processing_duration".into(), json!(duration));

        match state.formatted_response.as_mut() {
            Some(response) => response.metadata.completion_time = Some(now),
            None => warn!(run_id = %state.run_id, "No formatted response to finalize"),
        }

        info!(run_id = %state.run_id, processing_duration = duration, "Workflow completed successfully");
        Ok(())
    }
}
