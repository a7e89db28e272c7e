//! Per-specialist outcome records produced by the parallel stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle status of one specialist branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Pending,
    Running,
    Completed,
    Failed,
    OptedOut,
}

impl OutcomeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::OptedOut)
    }
}

/// Result of a specialist's opt-in judgment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptIn {
    /// No decision has been made yet.
    #[default]
    Undecided,
    OptedIn,
    OptedOut,
    DecisionFailed,
}

/// One specialist's outcome for one run.
///
/// Created pending when the branch is dispatched and immutable once it
/// reaches a terminal status; the transition methods leave terminal outcomes
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistOutcome {
    pub name: String,
    pub did_opt_in: OptIn,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_seconds: f64,
    pub status: OutcomeStatus,
    #[serde(default)]
    pub completion_metadata: BTreeMap<String, serde_json::Value>,
}

impl SpecialistOutcome {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            did_opt_in: OptIn::Undecided,
            content: String::new(),
            error: None,
            duration_seconds: 0.0,
            status: OutcomeStatus::Pending,
            completion_metadata: BTreeMap::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.status == OutcomeStatus::Completed
    }

    pub fn start(mut self) -> Self {
        if self.status == OutcomeStatus::Pending {
            self.status = OutcomeStatus::Running;
        }
        self
    }

    pub fn opted_out(mut self) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.did_opt_in = OptIn::OptedOut;
        self.status = OutcomeStatus::OptedOut;
        self.content.clear();
        self.duration_seconds = 0.0;
        self
    }

    pub fn decision_failed(mut self, error: impl Into<String>) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.did_opt_in = OptIn::DecisionFailed;
        self.status = OutcomeStatus::Failed;
        self.error = Some(error.into());
        self
    }

    pub fn completed(
        mut self,
        content: impl Into<String>,
        duration_seconds: f64,
        finished_at: DateTime<Utc>,
    ) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.did_opt_in = OptIn::OptedIn;
        self.status = OutcomeStatus::Completed;
        self.content = content.into();
        self.duration_seconds = duration_seconds;
        self.completion_metadata.insert(
            "completed_at".into(),
            serde_json::Value::String(finished_at.to_rfc3339()),
        );
        self
    }

    /// Generation failed (or timed out) after the specialist opted in.
    pub fn generation_failed(mut self, error: impl Into<String>, duration_seconds: f64) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.did_opt_in = OptIn::OptedIn;
        self.status = OutcomeStatus::Failed;
        self.content.clear();
        self.error = Some(error.into());
        self.duration_seconds = duration_seconds;
        self
    }

    /// Failure recorded outside the branch's own control flow (panic,
    /// aggregate fault). Keeps whatever opt-in state was reached.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.status = OutcomeStatus::Failed;
        self.content.clear();
        self.error = Some(error.into());
        self
    }
}
