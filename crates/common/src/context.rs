//! Per-(user, session) context persisted across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One past interaction in a session's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Shared context store entry keyed by `(user_id, session_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub user_id: String,
    pub session_id: String,

    /// Number of runs that have enriched this entry
    #[serde(default)]
    pub interaction_count: u64,

    #[serde(default)]
    pub preferences: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub business_context: BTreeMap<String, serde_json::Value>,

    /// Append-only, oldest first
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_timestamp: Option<DateTime<Utc>>,
}

impl ContextEntry {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            interaction_count: 0,
            preferences: BTreeMap::new(),
            business_context: BTreeMap::new(),
            conversation_history: Vec::new(),
            last_response: None,
            last_interaction: None,
            response_timestamp: None,
        }
    }

    /// Record a new interaction: bumps the counter and appends to history.
    pub fn record_interaction(
        &mut self,
        prompt: impl Into<String>,
        scope: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.interaction_count += 1;
        self.last_interaction = Some(at);
        self.conversation_history.push(HistoryEntry {
            timestamp: at,
            prompt: prompt.into(),
            scope,
        });
    }

    pub fn record_response(&mut self, response: impl Into<String>, at: DateTime<Utc>) {
        self.last_response = Some(response.into());
        self.response_timestamp = Some(at);
    }
}
