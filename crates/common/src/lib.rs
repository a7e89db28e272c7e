//! Common types and traits shared across the council crates.
//!
//! This crate provides the data model every stage and specialist branch
//! works on: the immutable [`Request`], the [`RunState`] threaded through
//! the pipeline, per-specialist [`SpecialistOutcome`]s, the shared
//! [`ContextEntry`] and the final [`FormattedResponse`].

pub mod context;
pub mod error;
pub mod outcome;
pub mod request;
pub mod response;
pub mod state;
pub mod traits;

pub use context::{ContextEntry, HistoryEntry};
pub use error::{CouncilError, Result, StageFailure};
pub use outcome::{OptIn, OutcomeStatus, SpecialistOutcome};
pub use request::Request;
pub use response::{Followup, FormattedResponse, ResponseMetadata, SpecialistInsight};
pub use state::{PipelineFlags, RunState, RunStatus, SpecialistResults, StageName, StepRecord};
pub use traits::Specialist;
