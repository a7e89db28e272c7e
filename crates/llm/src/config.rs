use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use council_common::{CouncilError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::retry::{RetryConfig, RetryingClient};
use crate::timeout::TimeoutClient;

/// Knobs applied around whatever model client the caller supplies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: Option<u64>,
    /// Cap on in-flight calls across every user of the client. Unset means
    /// no cap, so each specialist branch gets its own call.
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_temperature() -> Option<f32> {
    Some(0.25)
}

fn default_request_timeout() -> Option<u64> {
    Some(120_000)
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: None,
            request_timeout_ms: default_request_timeout(),
            max_concurrent_requests: None,
            retry: RetryConfig::default(),
        }
    }
}

pub struct SemaphoredClient {
    inner: Arc<dyn LlmClient>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl SemaphoredClient {
    pub fn new(inner: Arc<dyn LlmClient>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent.max(1))),
        }
    }
}

#[async_trait]
impl LlmClient for SemaphoredClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| CouncilError::Service(format!("Semaphore acquire failed: {e}")))?;
        self.inner.complete(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Fills in sampling parameters the caller left unset.
pub struct DefaultedClient<T: LlmClient> {
    inner: T,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl<T: LlmClient> DefaultedClient<T> {
    pub fn new(inner: T, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        Self {
            inner,
            temperature: temperature.map(|t| t.clamp(0.0, 2.0)),
            max_tokens,
        }
    }
}

#[async_trait]
impl<T: LlmClient> LlmClient for DefaultedClient<T> {
    async fn complete(&self, mut request: LlmRequest) -> Result<LlmResponse> {
        request.temperature = request.temperature.or(self.temperature);
        request.max_tokens = request.max_tokens.or(self.max_tokens);
        self.inner.complete(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Wrap a provider client with defaults, per-call timeout, retry and an
/// optional concurrency limit, in that order from the inside out.
pub fn build_llm_client(base: Arc<dyn LlmClient>, config: &LlmConfig) -> Arc<dyn LlmClient> {
    let defaulted: Box<dyn LlmClient> = Box::new(DefaultedClient::new(
        base,
        config.temperature,
        config.max_tokens,
    ));

    let bounded: Box<dyn LlmClient> = match config.request_timeout_ms {
        Some(ms) => Box::new(TimeoutClient::new(defaulted, Duration::from_millis(ms))),
        None => defaulted,
    };

    let retrying: Box<dyn LlmClient> =
        Box::new(RetryingClient::new(bounded, config.retry.clone()));

    let retrying: Arc<dyn LlmClient> = Arc::from(retrying);
    match config.max_concurrent_requests {
        Some(limit) => Arc::new(SemaphoredClient::new(retrying, limit)),
        None => retrying,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const TOML_CONFIG: &str = r#"
temperature = 0.5
max_tokens = 800
request_timeout_ms = 30000
max_concurrent_requests = 4

[retry]
max_retries = 5
initial_delay_ms = 1000
max_delay_ms = 60000
backoff_multiplier = 3.0
"#;

    #[test]
    fn deserialize_config_from_toml() {
        let config: LlmConfig = toml::from_str(TOML_CONFIG).unwrap();
        assert_eq!(config.temperature, Some(0.5));
        assert_eq!(config.max_tokens, Some(800));
        assert_eq!(config.request_timeout_ms, Some(30_000));
        assert_eq!(config.max_concurrent_requests, Some(4));
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_delay_ms, 1000);
    }

    #[test]
    fn deserialize_config_defaults() {
        let config: LlmConfig = toml::from_str("").unwrap();
        assert_eq!(config.temperature, Some(0.25));
        assert_eq!(config.request_timeout_ms, Some(120_000));
        assert_eq!(config.max_concurrent_requests, None);
        assert_eq!(config.retry.max_retries, 3);
    }

    /// Records the last request it saw.
    struct RecordingClient {
        last: Mutex<Option<LlmRequest>>,
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
            *self.last.lock().unwrap() = Some(request);
            Ok(LlmResponse {
                content: "ok".to_string(),
                model: "recording".to_string(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn built_client_applies_defaults_and_keeps_model_name() {
        let base = Arc::new(RecordingClient {
            last: Mutex::new(None),
        });
        let client = build_llm_client(base.clone(), &LlmConfig::default());

        assert_eq!(client.model_name(), "recording");

        client
            .complete(LlmRequest::prompt(None, "hello"))
            .await
            .unwrap();
        let seen = base.last.lock().unwrap().clone().unwrap();
        assert_eq!(seen.temperature, Some(0.25));

        let mut explicit = LlmRequest::prompt(None, "hello");
        explicit.temperature = Some(0.9);
        client.complete(explicit).await.unwrap();
        let seen = base.last.lock().unwrap().clone().unwrap();
        assert_eq!(seen.temperature, Some(0.9));
    }

    /// Overlap gauge around a model call. The first `flaky` calls fail with
    /// a retryable error.
    struct GaugeClient {
        in_flight: AtomicU32,
        peak: AtomicU32,
        calls: AtomicU32,
        flaky: u32,
        delay: Duration,
    }

    impl GaugeClient {
        fn new(flaky: u32, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                in_flight: AtomicU32::new(0),
                peak: AtomicU32::new(0),
                calls: AtomicU32::new(0),
                flaky,
                delay: Duration::from_millis(delay_ms),
            })
        }
    }

    #[async_trait]
    impl LlmClient for GaugeClient {
        async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.calls.fetch_add(1, Ordering::SeqCst) < self.flaky {
                return Err(CouncilError::Service("503 service unavailable".into()));
            }
            Ok(LlmResponse {
                content: "ok".to_string(),
                model: "gauge".to_string(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "gauge"
        }
    }

    async fn fire(client: Arc<dyn LlmClient>, n: usize) {
        let mut handles = Vec::new();
        for _ in 0..n {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.complete(LlmRequest::prompt(None, "q")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn built_client_has_no_cap_by_default() {
        let base = GaugeClient::new(0, 100);
        let client = build_llm_client(base.clone(), &LlmConfig::default());

        let started = std::time::Instant::now();
        fire(client, 5).await;

        assert_eq!(base.peak.load(Ordering::SeqCst), 5);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn configured_cap_holds_across_retries() {
        let base = GaugeClient::new(2, 30);
        let config = LlmConfig {
            max_concurrent_requests: Some(2),
            retry: RetryConfig {
                max_retries: 2,
                initial_delay_ms: 10,
                max_delay_ms: 20,
                backoff_multiplier: 1.0,
            },
            ..LlmConfig::default()
        };
        let client = build_llm_client(base.clone(), &config);

        fire(client, 6).await;

        // Retries run while the permit is held, so the cap still applies.
        assert!(base.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(base.calls.load(Ordering::SeqCst), 8);
    }
}
