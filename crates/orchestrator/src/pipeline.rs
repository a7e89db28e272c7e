//! The sequential stage chain.
//!
//! A [`StageChain`] holds exactly one stage per [`StageName`], in the fixed
//! order of [`StageName::ALL`]. Execution starts at the run's cursor so a
//! restored checkpoint picks up at the stage that had not yet completed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use council_common::{CouncilError, Result, RunState, RunStatus, StageFailure, StageName};
use council_memory::CheckpointStore;
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::CheckpointGranularity;

/// One step of the pipeline. A stage reads fields written by earlier stages
/// and writes only its own.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> StageName;

    async fn run(&self, state: &mut RunState) -> Result<()>;
}

pub struct StageChain {
    stages: Vec<Arc<dyn Stage>>,
    checkpoints: Arc<dyn CheckpointStore>,
    granularity: CheckpointGranularity,
}

impl std::fmt::Debug for StageChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageChain")
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("granularity", &self.granularity)
            .finish()
    }
}

impl StageChain {
    /// Assemble the chain. Fails unless `stages` names every stage exactly
    /// once in pipeline order.
    pub fn new(
        stages: Vec<Arc<dyn Stage>>,
        checkpoints: Arc<dyn CheckpointStore>,
        granularity: CheckpointGranularity,
    ) -> Result<Self> {
        let names: Vec<StageName> = stages.iter().map(|s| s.name()).collect();
        if names != StageName::ALL {
            return Err(CouncilError::Config(format!(
                "stage chain must be {:?}, got {:?}",
                StageName::ALL,
                names
            )));
        }

        Ok(Self {
            stages,
            checkpoints,
            granularity,
        })
    }

    /// Run every remaining stage, then mark the run completed. The state is
    /// checkpointed under `key` when the chain finishes or aborts.
    pub async fn run(&self, state: &mut RunState, key: &str) -> Result<()> {
        state.status = RunStatus::Running;

        while let Some(stage) = self.stages.get(state.cursor) {
            let name = stage.name();
            state.add_step(name.as_str());
            info!(run_id = %state.run_id, stage = %name, cursor = state.cursor, "Entering stage");

            let span = info_span!("stage", stage = %name);
            if let Err(e) = stage.run(state).instrument(span).await {
                return Err(self.abort(state, key, name, e).await);
            }

            state.cursor += 1;
            if self.granularity == CheckpointGranularity::Stage {
                self.checkpoint(key, state).await;
            }
        }

        state.end_time = Some(Utc::now());
        state.add_step("workflow_completed");
        state.status = RunStatus::Completed;
        info!(
            run_id = %state.run_id,
            elapsed_seconds = state.elapsed_seconds(),
            "Run completed"
        );

        self.checkpoint(key, state).await;
        Ok(())
    }

    async fn abort(
        &self,
        state: &mut RunState,
        key: &str,
        stage: StageName,
        cause: CouncilError,
    ) -> CouncilError {
        error!(run_id = %state.run_id, stage = %stage, error = %cause, "Stage failed, aborting run");

        state.add_error(format!("{stage} failed: {cause}"));
        state.status = RunStatus::Failed;
        self.checkpoint(key, state).await;

        CouncilError::Stage(Box::new(StageFailure {
            run_id: state.run_id.clone(),
            stage,
            message: cause.to_string(),
            step_log: state.step_log.clone(),
            error_log: state.error_log.clone(),
        }))
    }

    /// A failed checkpoint write is logged and does not change the run's
    /// result.
    async fn checkpoint(&self, key: &str, state: &RunState) {
        if let Err(e) = self.checkpoints.save(key, state).await {
            warn!(run_id = %state.run_id, key = %key, error = %e, "Checkpoint write failed");
        }
    }
}
