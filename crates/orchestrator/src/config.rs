//! Engine configuration.
//!
//! Loaded from TOML. On Unix the file must be a regular file that is not
//! world-writable.

use std::path::Path;
use std::time::Duration;

use council_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// When the engine writes run checkpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointGranularity {
    /// Once per chain execution, after it succeeds or fails
    #[default]
    Run,
    /// After every stage, plus the chain boundary
    Stage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deadline for one specialist branch, decide and generate together
    #[serde(default = "default_branch_timeout")]
    pub branch_timeout_ms: u64,

    #[serde(default)]
    pub checkpoint: CheckpointGranularity,

    /// Language assumed for requests that don't name one
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Summary used when no specialist produced content
    #[serde(default = "default_fallback_summary")]
    pub fallback_summary: String,

    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_branch_timeout() -> u64 {
    60_000
}

fn default_language() -> String {
    "en".into()
}

fn default_fallback_summary() -> String {
    "I'm unable to provide advice at the moment.".into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            branch_timeout_ms: default_branch_timeout(),
            checkpoint: CheckpointGranularity::default(),
            default_language: default_language(),
            fallback_summary: default_fallback_summary(),
            llm: LlmConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file, checking file permissions first
    /// on Unix.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        Self::from_file_unchecked(path)
    }

    /// Load configuration from a TOML file without permission checks.
    pub fn from_file_unchecked(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        debug!(path = %path.display(), ?config, "Loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.branch_timeout_ms == 0 {
            anyhow::bail!("branch_timeout_ms must be greater than zero");
        }
        if self.fallback_summary.trim().is_empty() {
            anyhow::bail!("fallback_summary must not be empty");
        }
        Ok(())
    }

    pub fn branch_timeout(&self) -> Duration {
        Duration::from_millis(self.branch_timeout_ms)
    }
}

#[cfg(unix)]
fn validate_config_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!(
            "Config path '{}' is not a regular file. Symlinks and directories are not allowed.",
            path.display()
        );
    }

    let permission_bits = metadata.permissions().mode() & 0o777;
    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}
