use async_trait::async_trait;
use council_common::{CouncilError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider for a JSON object/array response.
    #[serde(default)]
    pub json_mode: bool,
}

impl LlmRequest {
    /// Single-turn request with an optional system prompt.
    pub fn prompt(system_prompt: Option<&str>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.map(str::to_string),
            messages: vec![ChatMessage {
                role: Role::User,
                content: user_prompt.into(),
            }],
            ..Default::default()
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

/// The language-model service consumed by specialists and synthesis stages.
///
/// Implementations report every failure (timeout, auth, rate limit, ...) as
/// [`CouncilError::Service`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;
    fn model_name(&self) -> &str;
}

#[async_trait]
impl LlmClient for Box<dyn LlmClient> {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        (**self).complete(request).await
    }
    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl LlmClient for std::sync::Arc<dyn LlmClient> {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        (**self).complete(request).await
    }
    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// `complete(system?, user, json_mode)` returning only the text, with any
/// failure collapsed into a single [`CouncilError::Service`].
pub async fn complete_text(
    client: &dyn LlmClient,
    system_prompt: Option<&str>,
    user_prompt: &str,
    json_mode: bool,
) -> Result<String> {
    let mut request = LlmRequest::prompt(system_prompt, user_prompt);
    if json_mode {
        request = request.json();
    }

    client
        .complete(request)
        .await
        .map(|response| response.content)
        .map_err(|e| match e {
            CouncilError::Service(_) => e,
            other => CouncilError::Service(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
            let user = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(LlmResponse {
                content: format!(
                    "{}|{}|{}",
                    request.system_prompt.unwrap_or_default(),
                    user,
                    request.json_mode
                ),
                model: "echo".to_string(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct BrokenClient;

    #[async_trait]
    impl LlmClient for BrokenClient {
        async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse> {
            Err(CouncilError::Config("missing deployment".into()))
        }
        fn model_name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn prompt_builds_single_user_message() {
        let request = LlmRequest::prompt(Some("Be brief."), "Hi").json();
        assert_eq!(request.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.json_mode);
    }

    #[test]
    fn llm_request_serialization_roundtrip() {
        let request = LlmRequest {
            system_prompt: Some("You are helpful.".to_string()),
            messages: vec![ChatMessage {
                role: Role::User,
                content: "Hi".to_string(),
            }],
            temperature: Some(0.25),
            max_tokens: Some(1024),
            json_mode: true,
        };
        let json = serde_json::to_string(&request).unwrap();
        let deserialized: LlmRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(
            deserialized.system_prompt.as_deref(),
            Some("You are helpful.")
        );
        assert_eq!(deserialized.temperature, Some(0.25));
        assert!(deserialized.json_mode);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[tokio::test]
    async fn complete_text_passes_system_and_json_mode() {
        let text = complete_text(&EchoClient, Some("sys"), "question", true)
            .await
            .unwrap();
        assert_eq!(text, "sys|question|true");
    }

    #[tokio::test]
    async fn complete_text_collapses_errors_into_service_error() {
        let err = complete_text(&BrokenClient, None, "question", false)
            .await
            .unwrap_err();
        assert!(matches!(err, CouncilError::Service(_)));
        assert!(err.to_string().contains("missing deployment"));
    }
}
