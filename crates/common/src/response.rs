//! The formatted response returned to callers.

use crate::outcome::OutcomeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A suggested follow-up question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followup {
    pub question: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".into()
}

impl Followup {
    pub fn new(question: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            category: category.into(),
        }
    }
}

/// Content contributed by one specialist that opted in and succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistInsight {
    pub content: String,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Seconds from run start to formatting
    pub processing_time: f64,
    pub language: String,
    pub translated: bool,
    pub steps: Vec<String>,
    /// Status of every specialist, including opted-out and failed ones
    pub specialists: BTreeMap<String, OutcomeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedResponse {
    pub run_id: String,
    pub status: String,
    pub summary: String,
    pub followups: Vec<Followup>,
    pub specialist_insights: BTreeMap<String, SpecialistInsight>,
    pub metadata: ResponseMetadata,
}
