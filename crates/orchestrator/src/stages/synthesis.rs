//! Summary and follow-up stages.

use std::sync::Arc;

use async_trait::async_trait;
use council_common::{Result, RunState, SpecialistOutcome, StageName};
use tracing::{info, warn};

use crate::collaborators::{fallback_followups, FollowupGenerator, Summarizer};
use crate::pipeline::Stage;

/// Summarizes completed specialist answers. Opted-out and failed
/// specialists never reach the summarizer.
pub struct SummarizeStage {
    summarizer: Arc<dyn Summarizer>,
    fallback: String,
}

impl SummarizeStage {
    pub fn new(summarizer: Arc<dyn Summarizer>, fallback: impl Into<String>) -> Self {
        Self {
            summarizer,
            fallback: fallback.into(),
        }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    fn name(&self) -> StageName {
        StageName::Summarize
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        let completed: Vec<&SpecialistOutcome> = state.specialist_results.completed().collect();

        let summary = if completed.is_empty() {
            info!("No specialist contributed, using fallback summary");
            self.fallback.clone()
        } else {
            let summary = self.summarizer.summarize(&state.prompt, &completed).await?;
            if summary.trim().is_empty() {
                warn!("Summarizer returned nothing, using fallback summary");
                self.fallback.clone()
            } else {
                summary
            }
        };

        state.summary = summary;
        Ok(())
    }
}

pub struct FollowupStage {
    generator: Arc<dyn FollowupGenerator>,
}

impl FollowupStage {
    pub fn new(generator: Arc<dyn FollowupGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Stage for FollowupStage {
    fn name(&self) -> StageName {
        StageName::GenerateFollowups
    }

    /// Never fails: generation errors fall back to a fixed set of questions.
    async fn run(&self, state: &mut RunState) -> Result<()> {
        if state.summary.is_empty() {
            state.followups = Vec::new();
            return Ok(());
        }

        state.followups = match self.generator.followups(&state.prompt, &state.summary).await {
            Ok(followups) => followups,
            Err(e) => {
                warn!(error = %e, "Follow-up question generation failed");
                fallback_followups()
            }
        };
        Ok(())
    }
}
