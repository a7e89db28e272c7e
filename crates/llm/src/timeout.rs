use std::time::Duration;

use async_trait::async_trait;
use council_common::{CouncilError, Result};
use tracing::warn;

use crate::client::{LlmClient, LlmRequest, LlmResponse};

/// Bounds every model call by a fixed deadline.
pub struct TimeoutClient<T: LlmClient> {
    inner: T,
    timeout: Duration,
}

impl<T: LlmClient> TimeoutClient<T> {
    pub fn new(inner: T, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<T: LlmClient> LlmClient for TimeoutClient<T> {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        tokio::time::timeout(self.timeout, self.inner.complete(request))
            .await
            .map_err(|_| {
                warn!(model = self.inner.model_name(), timeout = ?self.timeout, "LLM request timed out");
                CouncilError::Service(format!("request timed out after {:?}", self.timeout))
            })?
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowClient(Duration);

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse> {
            tokio::time::sleep(self.0).await;
            Ok(LlmResponse {
                content: "late".to_string(),
                model: "slow".to_string(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn slow_call_becomes_service_error() {
        let client = TimeoutClient::new(
            SlowClient(Duration::from_millis(200)),
            Duration::from_millis(20),
        );

        let err = client.complete(LlmRequest::default()).await.unwrap_err();
        assert!(matches!(err, CouncilError::Service(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn fast_call_passes_through() {
        let client = TimeoutClient::new(
            SlowClient(Duration::from_millis(1)),
            Duration::from_millis(500),
        );

        let response = client.complete(LlmRequest::default()).await.unwrap();
        assert_eq!(response.content, "late");
        assert_eq!(client.model_name(), "slow");
    }
}
