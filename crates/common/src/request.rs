//! The immutable request submitted to the engine.

use serde::{Deserialize, Serialize};

/// A user request routed through the pipeline.
///
/// Owned exclusively by one run and never mutated after creation; stages that
/// need a rewritten prompt (e.g. translation) keep it on the run state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// The user's natural-language prompt
    pub prompt: String,

    /// Stable user identifier
    pub user_id: String,

    /// Session identifier, also used as the checkpoint resumption key
    pub session_id: String,

    /// Language the pipeline works in (ISO 639-1 code)
    pub target_language: String,

    /// Optional request scope (e.g. "validation", "fundraising")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Caller-supplied correlation id for log tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl Request {
    pub fn new(
        prompt: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            target_language: "en".into(),
            scope: None,
            correlation_id: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Checkpoint key for this request's run: `{user_id}/{session_id}`, so
    /// users that share a session id never see each other's runs.
    pub fn resumption_key(&self) -> String {
        format!("{}/{}", self.user_id, self.session_id)
    }

    /// Whether two requests ask the same thing of the same user and session,
    /// ignoring the correlation id.
    pub fn same_content(&self, other: &Request) -> bool {
        self.prompt == other.prompt
            && self.user_id == other.user_id
            && self.session_id == other.session_id
            && self.target_language == other.target_language
            && self.scope == other.scope
    }

    /// Prompt shortened for log lines.
    pub fn prompt_preview(&self) -> String {
        let preview: String = self.prompt.chars().take(100).collect();
        if preview.len() < self.prompt.len() {
            format!("{preview}...")
        } else {
            preview
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = Request::new("How do I validate my business idea?", "u1", "s1");

        assert_eq!(request.target_language, "en");
        assert_eq!(request.resumption_key(), "u1/s1");
        assert!(request.scope.is_none());
        assert!(request.correlation_id.is_none());
    }

    #[test]
    fn test_request_builder_methods() {
        let request = Request::new("Hola", "u1", "s1")
            .with_language("es")
            .with_scope("validation")
            .with_correlation_id("corr-1");

        assert_eq!(request.target_language, "es");
        assert_eq!(request.scope.as_deref(), Some("validation"));
        assert_eq!(request.correlation_id.as_deref(), Some("corr-1"));
    }

    #[test]
    fn test_same_content_ignores_correlation_id() {
        let a = Request::new("Same question", "u1", "s1").with_correlation_id("a");
        let b = Request::new("Same question", "u1", "s1").with_correlation_id("b");
        let c = Request::new("Other question", "u1", "s1");

        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_resumption_key_separates_users() {
        let a = Request::new("Same question", "u1", "s1");
        let b = Request::new("Same question", "u2", "s1");

        assert_ne!(a.resumption_key(), b.resumption_key());
    }

    #[test]
    fn test_prompt_preview_truncates_long_prompts() {
        let long = "x".repeat(150);
        let request = Request::new(long, "u1", "s1");

        let preview = request.prompt_preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 103);
    }

    #[test]
    fn test_request_deserializes_without_optional_fields() {
        let json = r#"{"prompt":"p","user_id":"u","session_id":"s","target_language":"fr"}"#;
        let request: Request = serde_json::from_str(json).unwrap();

        assert_eq!(request.target_language, "fr");
        assert!(request.scope.is_none());
    }
}
