//! Language-model service contract for the council engine.
//!
//! The engine never talks to a provider directly. Callers supply an
//! [`LlmClient`] implementation and wrap it with [`build_llm_client`] to get
//! sampling defaults, a per-call timeout, retry with backoff and an optional
//! concurrency limit.

pub mod client;
pub mod config;
pub mod retry;
pub mod timeout;

pub use client::{complete_text, ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{build_llm_client, DefaultedClient, LlmConfig, SemaphoredClient};
pub use retry::{RetryConfig, RetryingClient};
pub use timeout::TimeoutClient;
