//! Orchestration engine for the council of specialists.
//!
//! A request passes through a fixed chain of ten stages. One of them,
//! `run-specialists`, fans the prompt out to every registered specialist in
//! parallel and waits for all of them before the chain moves on.
//!
//! ```text
//! Request
//!    │
//!    ▼
//! pre ─► translate-in ─► enrich-context ─► run-specialists ─► summarize
//!                             │                  │                │
//!                       ContextStore     ┌───────┼───────┐        ▼
//!                          (get)         ▼       ▼       ▼  generate-followups
//!                                        A       B       C        │
//!                                        └───────┼───────┘        ▼
//!                                           fan-in barrier   format-response
//!                                                                 │
//!      post ◄─ translate-out ◄─ update-context (ContextStore put) ◄┘
//!        │
//!        ▼
//! FormattedResponse          (CheckpointStore: saved per run or per stage)
//! ```
//!
//! ```ignore
//! let engine = Engine::builder()
//!     .config(EngineConfig::from_file("council.toml")?)
//!     .llm(Arc::new(my_provider))
//!     .build()?;
//!
//! let response = engine
//!     .process(Request::new("How do I validate my business idea?", "u1", "s1"))
//!     .await?;
//! ```

pub mod collaborators;
pub mod config;
pub mod engine;
pub mod parallel;
pub mod pipeline;
pub mod stages;

pub use collaborators::{
    fallback_followups, parse_followups, FollowupGenerator, LlmFollowupGenerator, LlmSummarizer,
    PassthroughTranslator, Summarizer, Translator,
};
pub use config::{CheckpointGranularity, EngineConfig};
pub use engine::{Engine, EngineBuilder};
pub use parallel::ParallelStage;
pub use pipeline::{Stage, StageChain};
