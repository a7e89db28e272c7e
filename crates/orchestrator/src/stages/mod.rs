//! The pipeline stages, other than the parallel specialist stage which
//! lives in [`crate::parallel`].

mod context;
mod format;
mod pre;
mod synthesis;
mod translate;

pub use context::{EnrichContextStage, UpdateContextStage};
pub use format::{FormatResponseStage, PostStage};
pub use pre::PreStage;
pub use synthesis::{FollowupStage, SummarizeStage};
pub use translate::{TranslateInStage, TranslateOutStage};
