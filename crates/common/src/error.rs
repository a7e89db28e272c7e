//! Error types for the council engine.

use crate::state::{StageName, StepRecord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CouncilError {
    /// A specialist's opt-in judgment could not be completed.
    #[error("Decision error: {0}")]
    Decision(String),

    /// A specialist failed to generate content.
    #[error("Generation error: {0}")]
    Generation(String),

    /// The language-model service failed (timeout, auth, rate limit, ...).
    #[error("Service error: {0}")]
    Service(String),

    /// A pipeline stage faulted and the run was aborted.
    #[error("{0}")]
    Stage(Box<StageFailure>),

    /// The fan-out/fan-in machinery itself faulted.
    #[error("Aggregate stage error: {0}")]
    AggregateStage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CouncilError {
    /// Run id of the aborted run, when this is a stage failure.
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::Stage(failure) => Some(&failure.run_id),
            _ => None,
        }
    }

    /// Stage at which the run was aborted, when this is a stage failure.
    pub fn failed_stage(&self) -> Option<StageName> {
        match self {
            Self::Stage(failure) => Some(failure.stage),
            _ => None,
        }
    }
}

/// Diagnostic payload of a run aborted by a failing stage.
#[derive(Debug, Clone)]
pub struct StageFailure {
    pub run_id: String,
    pub stage: StageName,
    pub message: String,
    pub step_log: Vec<StepRecord>,
    pub error_log: Vec<String>,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' failed in run {}: {}",
            self.stage, self.run_id, self.message
        )
    }
}

pub type Result<T> = std::result::Result<T, CouncilError>;
