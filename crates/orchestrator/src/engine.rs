//! Engine entry point: `process(request) -> FormattedResponse`.

use std::sync::Arc;

use council_common::{
    CouncilError, FormattedResponse, Request, Result, RunState, StageFailure, StageName,
};
use council_llm::{build_llm_client, LlmClient};
use council_memory::{CheckpointStore, ContextStore, InMemoryCheckpointStore, InMemoryContextStore};
use council_specialists::SpecialistRegistry;
use tracing::{field, info, info_span, warn, Instrument, Span};

use crate::collaborators::{
    FollowupGenerator, LlmFollowupGenerator, LlmSummarizer, PassthroughTranslator, Summarizer,
    Translator,
};
use crate::config::EngineConfig;
use crate::parallel::ParallelStage;
use crate::pipeline::{Stage, StageChain};
use crate::stages::{
    EnrichContextStage, FollowupStage, FormatResponseStage, PostStage, PreStage, SummarizeStage,
    TranslateInStage, TranslateOutStage, UpdateContextStage,
};

/// The council engine. Build one with [`Engine::builder`]; it is cheap to
/// share behind an `Arc` and safe to call concurrently.
pub struct Engine {
    chain: StageChain,
    registry: Arc<SpecialistRegistry>,
    context: Arc<dyn ContextStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    config: EngineConfig,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn registry(&self) -> &SpecialistRegistry {
        &self.registry
    }

    pub fn context_store(&self) -> &Arc<dyn ContextStore> {
        &self.context
    }

    pub fn checkpoint_store(&self) -> &Arc<dyn CheckpointStore> {
        &self.checkpoints
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `request` through the pipeline.
    ///
    /// When the request's user and session hold an unfinished checkpoint for
    /// the same prompt, that run continues from its next stage. Otherwise a
    /// new run starts.
    pub async fn process(&self, request: Request) -> Result<FormattedResponse> {
        let key = request.resumption_key();
        let span = run_span(&request);

        async move {
            let restored = self.restorable(&key, &request).await;
            let mut state = match restored {
                Some(saved) => {
                    info!(run_id = %saved.run_id, next_stage = ?saved.next_stage(), "Resuming unfinished run");
                    saved
                }
                None => RunState::new(request),
            };
            self.execute(&mut state, &key).await
        }
        .instrument(span)
        .await
    }

    /// Continue the run checkpointed under `key` (see
    /// [`Request::resumption_key`]). A run that already completed returns its
    /// stored response.
    pub async fn resume(&self, key: &str) -> Result<FormattedResponse> {
        let mut state = self
            .checkpoints
            .load(key)
            .await?
            .ok_or_else(|| CouncilError::Checkpoint(format!("no checkpoint under '{key}'")))?;

        let span = run_span(state.request());
        async move {
            if state.is_finished() {
                info!(run_id = %state.run_id, "Run already completed");
                return finished_response(&state);
            }
            info!(run_id = %state.run_id, next_stage = ?state.next_stage(), "Resuming run");
            self.execute(&mut state, key).await
        }
        .instrument(span)
        .await
    }

    async fn restorable(&self, key: &str, request: &Request) -> Option<RunState> {
        match self.checkpoints.load(key).await {
            Ok(Some(saved))
                if !saved.is_finished() && saved.request().same_content(request) =>
            {
                Some(saved)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable checkpoint, starting a new run");
                None
            }
        }
    }

    async fn execute(&self, state: &mut RunState, key: &str) -> Result<FormattedResponse> {
        Span::current().record("run_id", state.run_id.as_str());
        self.chain.run(state, key).await?;
        finished_response(state)
    }
}

fn run_span(request: &Request) -> Span {
    info_span!(
        "run",
        run_id = field::Empty,
        correlation_id = request.correlation_id.as_deref().unwrap_or("-"),
        session_id = %request.session_id,
    )
}

fn finished_response(state: &RunState) -> Result<FormattedResponse> {
    state.formatted_response.clone().ok_or_else(|| {
        CouncilError::Stage(Box::new(StageFailure {
            run_id: state.run_id.clone(),
            stage: StageName::FormatResponse,
            message: "run finished without a formatted response".into(),
            step_log: state.step_log.clone(),
            error_log: state.error_log.clone(),
        }))
    })
}

/// Assembles an [`Engine`]. Every collaborator has a default; the
/// model-backed defaults (advisors, summarizer, follow-ups) need
/// [`EngineBuilder::llm`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    llm: Option<Arc<dyn LlmClient>>,
    registry: Option<SpecialistRegistry>,
    translator: Option<Arc<dyn Translator>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    followups: Option<Arc<dyn FollowupGenerator>>,
    context: Option<Arc<dyn ContextStore>>,
    checkpoints: Option<Arc<dyn CheckpointStore>>,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Model client; wrapped with the configured defaults, timeout, retry
    /// and concurrency limit.
    pub fn llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn registry(mut self, registry: SpecialistRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn followup_generator(mut self, generator: Arc<dyn FollowupGenerator>) -> Self {
        self.followups = Some(generator);
        self
    }

    pub fn context_store(mut self, store: Arc<dyn ContextStore>) -> Self {
        self.context = Some(store);
        self
    }

    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = Some(store);
        self
    }

    pub fn build(self) -> Result<Engine> {
        self.config
            .validate()
            .map_err(|e| CouncilError::Config(e.to_string()))?;

        let llm = self
            .llm
            .map(|base| build_llm_client(base, &self.config.llm));
        let require_llm = |what: &str| {
            llm.clone().ok_or_else(|| {
                CouncilError::Config(format!("{what} needs an LLM client or an explicit override"))
            })
        };

        let registry = match self.registry {
            Some(registry) => registry,
            None => SpecialistRegistry::with_default_advisors(require_llm("default advisors")?),
        };
        let summarizer: Arc<dyn Summarizer> = match self.summarizer {
            Some(summarizer) => summarizer,
            None => Arc::new(LlmSummarizer::new(require_llm("summarizer")?)),
        };
        let followups: Arc<dyn FollowupGenerator> = match self.followups {
            Some(generator) => generator,
            None => Arc::new(LlmFollowupGenerator::new(require_llm("follow-up generator")?)),
        };
        let translator = self.translator.unwrap_or_else(|| {
            Arc::new(PassthroughTranslator::new(&self.config.default_language)) as Arc<dyn Translator>
        });
        let context = self
            .context
            .unwrap_or_else(|| Arc::new(InMemoryContextStore::new()) as Arc<dyn ContextStore>);
        let checkpoints = self
            .checkpoints
            .unwrap_or_else(|| Arc::new(InMemoryCheckpointStore::new()) as Arc<dyn CheckpointStore>);

        let registry = Arc::new(registry);
        let stages: Vec<Arc<dyn Stage>> = vec![
            Arc::new(PreStage),
            Arc::new(TranslateInStage::new(
                translator.clone(),
                &self.config.default_language,
            )),
            Arc::new(EnrichContextStage::new(context.clone())),
            Arc::new(ParallelStage::new(
                registry.clone(),
                self.config.branch_timeout(),
            )),
            Arc::new(SummarizeStage::new(
                summarizer,
                &self.config.fallback_summary,
            )),
            Arc::new(FollowupStage::new(followups)),
            Arc::new(FormatResponseStage),
            Arc::new(UpdateContextStage::new(context.clone())),
            Arc::new(TranslateOutStage::new(translator)),
            Arc::new(PostStage),
        ];
        let chain = StageChain::new(stages, checkpoints.clone(), self.config.checkpoint)?;

        info!(
            specialists = ?registry.names(),
            checkpoint = ?self.config.checkpoint,
            branch_timeout_ms = self.config.branch_timeout_ms,
            "Engine ready"
        );

        Ok(Engine {
            chain,
            registry,
            context,
            checkpoints,
            config: self.config,
        })
    }
}
