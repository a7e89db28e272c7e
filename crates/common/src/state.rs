//! Run state threaded through every pipeline stage.

use crate::context::ContextEntry;
use crate::error::{CouncilError, Result};
use crate::outcome::SpecialistOutcome;
use crate::request::Request;
use crate::response::{FormattedResponse, Followup};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    Pre,
    TranslateIn,
    EnrichContext,
    RunSpecialists,
    Summarize,
    GenerateFollowups,
    FormatResponse,
    UpdateContext,
    TranslateOut,
    Post,
}

impl StageName {
    pub const ALL: [StageName; 10] = [
        StageName::Pre,
        StageName::TranslateIn,
        StageName::EnrichContext,
        StageName::RunSpecialists,
        StageName::Summarize,
        StageName::GenerateFollowups,
        StageName::FormatResponse,
        StageName::UpdateContext,
        StageName::TranslateOut,
        StageName::Post,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::TranslateIn => "translate-in",
            Self::EnrichContext => "enrich-context",
            Self::RunSpecialists => "run-specialists",
            Self::Summarize => "summarize",
            Self::GenerateFollowups => "generate-followups",
            Self::FormatResponse => "format-response",
            Self::UpdateContext => "update-context",
            Self::TranslateOut => "translate-out",
            Self::Post => "post",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only step log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    pub at: DateTime<Utc>,
}

impl std::fmt::Display for StepRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.step, self.at.to_rfc3339())
    }
}

/// Language handling flags set by the translate-in stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFlags {
    pub needs_translation: bool,
    pub source_language: String,
    pub target_language: String,
}

/// Overall status of a run, used to decide whether a checkpoint is resumable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

/// Specialist outcomes keyed by specialist name.
///
/// Each key is written at most once with a terminal outcome; later writes to
/// the same key are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecialistResults(BTreeMap<String, SpecialistOutcome>);

impl SpecialistResults {
    pub fn insert_once(&mut self, outcome: SpecialistOutcome) -> Result<()> {
        if !outcome.is_terminal() {
            return Err(CouncilError::AggregateStage(format!(
                "outcome for '{}' merged before reaching a terminal status",
                outcome.name
            )));
        }
        if self.0.contains_key(&outcome.name) {
            return Err(CouncilError::AggregateStage(format!(
                "outcome for '{}' was already merged",
                outcome.name
            )));
        }
        self.0.insert(outcome.name.clone(), outcome);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SpecialistOutcome> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpecialistOutcome> {
        self.0.values()
    }

    /// Outcomes that opted in and succeeded, in name order.
    pub fn completed(&self) -> impl Iterator<Item = &SpecialistOutcome> {
        self.0.values().filter(|o| o.is_completed())
    }
}

/// The mutable record of one pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Generated once at creation; also used in checkpoint payloads
    pub run_id: String,

    request: Request,

    /// Prompt the specialists work on (translated when needed)
    pub prompt: String,

    pub flags: PipelineFlags,

    /// Free-form values written by stages, last writer wins per key
    #[serde(default)]
    pub working_context: BTreeMap<String, serde_json::Value>,

    /// Context store entry loaded by enrich-context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_context: Option<ContextEntry>,

    #[serde(default)]
    pub specialist_results: SpecialistResults,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub followups: Vec<Followup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_response: Option<FormattedResponse>,

    pub start_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub step_log: Vec<StepRecord>,

    #[serde(default)]
    pub error_log: Vec<String>,

    /// Index into [`StageName::ALL`] of the next stage to execute
    #[serde(default)]
    pub cursor: usize,

    #[serde(default)]
    pub status: RunStatus,
}

impl RunState {
    pub fn new(request: Request) -> Self {
        let flags = PipelineFlags {
            needs_translation: false,
            source_language: request.target_language.clone(),
            target_language: request.target_language.clone(),
        };

        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            prompt: request.prompt.clone(),
            request,
            flags,
            working_context: BTreeMap::new(),
            session_context: None,
            specialist_results: SpecialistResults::default(),
            summary: String::new(),
            followups: Vec::new(),
            formatted_response: None,
            start_time: Utc::now(),
            end_time: None,
            step_log: Vec::new(),
            error_log: Vec::new(),
            cursor: 0,
            status: RunStatus::Running,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn add_step(&mut self, step: impl Into<String>) {
        self.step_log.push(StepRecord {
            step: step.into(),
            at: Utc::now(),
        });
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.error_log
            .push(format!("{}: {}", error.into(), Utc::now().to_rfc3339()));
    }

    /// The stage the chain will execute next, if any remain.
    pub fn next_stage(&self) -> Option<StageName> {
        StageName::ALL.get(self.cursor).copied()
    }

    /// A completed run has nothing left to resume.
    pub fn is_finished(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
