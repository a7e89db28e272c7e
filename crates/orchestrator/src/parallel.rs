//! Parallel specialist stage.
//!
//! Every registered specialist runs as its own tokio task: decide, then
//! generate if it opted in. The stage waits for every branch before merging,
//! and a failing, hanging or panicking branch only affects its own outcome.
//!
//! ```text
//!              ┌──────────── run-specialists ────────────┐
//!              │                                          │
//!  prompt ────►│  spawn ─► [A: decide ─► generate] ─┐     │
//!              │  spawn ─► [B: decide ─► opted out] ─┼─►  │──► specialist_results
//!              │  spawn ─► [C: decide ✗]            ─┘    │     (merged once)
//!              │          join all (deadline-bounded)     │
//!              └──────────────────────────────────────────┘
//! ```

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use council_common::{
    CouncilError, Result, RunState, Specialist, SpecialistOutcome, SpecialistResults, StageName,
};
use council_specialists::SpecialistRegistry;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::pipeline::Stage;

/// Extra time the barrier gives a branch past its own deadline before
/// aborting the task. Only matters for branches that block a worker thread.
const JOIN_GRACE: Duration = Duration::from_millis(250);

pub struct ParallelStage {
    registry: Arc<SpecialistRegistry>,
    branch_timeout: Duration,
}

impl ParallelStage {
    pub fn new(registry: Arc<SpecialistRegistry>, branch_timeout: Duration) -> Self {
        Self {
            registry,
            branch_timeout,
        }
    }

    /// Run every registered specialist against `prompt` and return one
    /// terminal outcome per specialist, in registry order.
    pub async fn fan_out(&self, prompt: &str) -> Vec<SpecialistOutcome> {
        let names = self.registry.names();

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                let fault = CouncilError::AggregateStage(format!("no async runtime: {e}"));
                error!(error = %fault, "Cannot fan out specialists");
                return names
                    .into_iter()
                    .map(|name| SpecialistOutcome::pending(name).failed(fault.to_string()))
                    .collect();
            }
        };

        info!(specialist_count = names.len(), timeout = ?self.branch_timeout, "Fanning out to specialists");

        let deadline = Instant::now() + self.branch_timeout;
        let mut branches: Vec<(String, Option<JoinHandle<SpecialistOutcome>>)> =
            Vec::with_capacity(names.len());

        for name in names {
            let Some(specialist) = self.registry.construct(&name) else {
                branches.push((name, None));
                continue;
            };
            let slot = SpecialistOutcome::pending(&name);
            let prompt = prompt.to_string();
            let span = info_span!("specialist", specialist = %name);

            let handle = runtime.spawn(run_branch(specialist, slot, prompt, deadline).instrument(span));
            branches.push((name, Some(handle)));
        }

        // Barrier: every branch is terminal before anything is returned.
        let mut outcomes = Vec::with_capacity(branches.len());
        for (name, handle) in branches {
            let outcome = match handle {
                Some(handle) => join_branch(&name, handle, deadline + JOIN_GRACE).await,
                None => SpecialistOutcome::pending(&name)
                    .failed("specialist is no longer registered"),
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

#[async_trait]
impl Stage for ParallelStage {
    fn name(&self) -> StageName {
        StageName::RunSpecialists
    }

    async fn run(&self, state: &mut RunState) -> Result<()> {
        let outcomes = self.fan_out(&state.prompt).await;

        let mut merged = SpecialistResults::default();
        for outcome in outcomes {
            merged.insert_once(outcome)?;
        }

        info!(
            total = merged.len(),
            completed = merged.completed().count(),
            "Specialist fan-in complete"
        );
        state.specialist_results = merged;
        Ok(())
    }
}

async fn run_branch(
    specialist: Arc<dyn Specialist>,
    slot: SpecialistOutcome,
    prompt: String,
    deadline: Instant,
) -> SpecialistOutcome {
    let outcome = slot.start();

    let opted_in = match timeout_at(deadline, specialist.decide(&prompt)).await {
        Ok(Ok(decision)) => decision,
        Ok(Err(e)) => {
            warn!(error = %e, "Opt-in decision failed");
            return outcome.decision_failed(e.to_string());
        }
        Err(_) => {
            warn!("Opt-in decision timed out");
            return outcome.decision_failed("decision timed out");
        }
    };

    if !opted_in {
        debug!("Specialist opted out");
        return outcome.opted_out();
    }

    let started = std::time::Instant::now();
    match timeout_at(deadline, specialist.generate(&prompt)).await {
        Ok(Ok(content)) => {
            let elapsed = started.elapsed().as_secs_f64();
            info!(duration_seconds = elapsed, "Specialist completed");
            outcome.completed(content, elapsed, Utc::now())
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Specialist generation failed");
            outcome.generation_failed(e.to_string(), started.elapsed().as_secs_f64())
        }
        Err(_) => {
            warn!("Specialist generation timed out");
            outcome.generation_failed("generation timed out", started.elapsed().as_secs_f64())
        }
    }
}

/// Await one branch, converting a panic, cancellation or overrun into a
/// failed outcome. An overrunning task is aborted.
async fn join_branch(
    name: &str,
    mut handle: JoinHandle<SpecialistOutcome>,
    hard_deadline: Instant,
) -> SpecialistOutcome {
    match timeout_at(hard_deadline, &mut handle).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) if e.is_panic() => {
            let message = panic_message(e.into_panic());
            error!(specialist = %name, panic = %message, "Specialist branch panicked");
            SpecialistOutcome::pending(name).failed(format!("specialist panicked: {message}"))
        }
        Ok(Err(e)) => {
            error!(specialist = %name, error = %e, "Task join error");
            SpecialistOutcome::pending(name).failed(format!("task join error: {e}"))
        }
        Err(_) => {
            handle.abort();
            error!(specialist = %name, "Specialist branch overran its deadline, aborted");
            SpecialistOutcome::pending(name).failed("specialist timed out")
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
