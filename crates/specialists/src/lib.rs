//! Specialists for the council engine.
//!
//! - [`SpecialistRegistry`]: name to factory map the parallel stage draws from
//! - [`AdvisorSpecialist`]: model-backed specialist built from an [`AdvisorProfile`]
//! - [`OptInJudge`]: the yes/no relevance check every advisor runs first
//! - [`Blocking`]: adapter for specialists with a synchronous provider
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │    SpecialistRegistry    │
//!                 └────────────┬─────────────┘
//!          ┌──────────┬────────┼─────────┬──────────┐
//!          ▼          ▼        ▼         ▼          ▼
//!     business    market   financial   legal   technical
//!          │          │        │         │          │
//!          └──────────┴────────┼─────────┴──────────┘
//!                              ▼
//!                    decide ──► generate
//!                    (OptInJudge)  (LlmClient)
//! ```

pub mod advisor;
pub mod advisors;
pub mod blocking;
pub mod decision;
pub mod registry;

pub use advisor::{AdvisorProfile, AdvisorSpecialist};
pub use blocking::{Blocking, BlockingSpecialist};
pub use decision::{parse_decision, OptInJudge};
pub use registry::{SpecialistFactory, SpecialistRegistry};
