use std::sync::Arc;

use async_trait::async_trait;
use council_common::{Result, RunState, StageName};
use tracing::{debug, info};

use crate::collaborators::Translator;
use crate::pipeline::Stage;

/// Detects the prompt's language and, when it differs from the target,
/// replaces the working prompt with a translation. The request itself is
/// left untouched.
pub struct TranslateInStage {
    translator: Arc<dyn Translator>,
    default_language: String,
}

impl TranslateInStage {
    pub fn new(translator: Arc<dyn Translator>, default_language: impl Into<String>) -> Self {
        Self {
            translator,
            default_language: default_language.into(),
        }
    }
}

#[async_trait]
impl Stage for TranslateInStage {
    fn name(&self) -> StageName {
        StageName::TranslateIn
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        let requested = state.request().target_language.trim();
        let target = if requested.is_empty() {
            self.default_language.clone()
        } else {
            requested.to_string()
        };

        let source = self.translator.detect(&state.prompt).await?;
        state.flags.source_language = source.clone();
        state.flags.target_language = target.clone();
        state.flags.needs_translation = source != target;

        if state.flags.needs_translation {
            info!(from = %source, to = %target, "Translating prompt");
            state.prompt = self
                .translator
                .translate(&state.prompt, &source, &target)
                .await?;
        } else {
            debug!(language = %target, "No translation needed");
        }
        Ok(())
    }
}

/// Translates the summary and follow-up questions back to the user's
/// language, in the state and in the formatted response.
pub struct TranslateOutStage {
    translator: Arc<dyn Translator>,
}

impl TranslateOutStage {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }
}

#[async_trait]
impl Stage for TranslateOutStage {
    fn name(&self) -> StageName {
        StageName::TranslateOut
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        if !state.flags.needs_translation {
            return Ok(());
        }
        let from = state.flags.target_language.clone();
        let to = state.flags.source_language.clone();
        info!(from = %from, to = %to, "Translating response");

        if !state.summary.is_empty() {
            state.summary = self.translator.translate(&state.summary, &from, &to).await?;
        }
        for followup in &mut state.followups {
            followup.question = self
                .translator
                .translate(&followup.question, &from, &to)
                .await?;
        }

        if let Some(response) = state.formatted_response.as_mut() {
            response.summary = state.summary.clone();
            response.followups = state.followups.clone();
            response.metadata.language = to;
        }
        Ok(())
    }
}
