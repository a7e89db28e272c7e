//! Core specialist capability trait.
//!
//! Defined in `council-common` so that the specialist crate and the
//! orchestrator can both reference it without circular dependencies.

use crate::Result;
use async_trait::async_trait;

/// A pluggable specialist that judges whether a request is relevant to it
/// and, when it is, produces domain-specific content.
#[async_trait]
pub trait Specialist: Send + Sync {
    /// Unique registry name (e.g. "market_analyst").
    fn name(&self) -> &str;

    /// Human-readable description of the specialization.
    fn description(&self) -> &str;

    /// Decide whether to answer `prompt`.
    ///
    /// Fails with [`crate::CouncilError::Decision`] when the judgment cannot be
    /// completed. Implementations must never default to `true` on failure.
    async fn decide(&self, prompt: &str) -> Result<bool>;

    /// Produce this specialist's answer to `prompt`.
    ///
    /// Fails with [`crate::CouncilError::Generation`].
    async fn generate(&self, prompt: &str) -> Result<String>;
}
