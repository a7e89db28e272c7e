//! Storage for the council engine.
//!
//! - [`ContextStore`]: per-(user, session) context shared across runs
//! - [`CheckpointStore`]: run snapshots for resuming interrupted work
//!
//! Both ship with in-memory implementations backed by `tokio::sync::RwLock`.
//!
//! ```text
//!   enrich-context ──get──►┌──────────────────┐◄──put── update-context
//!                          │   ContextStore   │
//!                          └──────────────────┘
//!
//!   StageChain ──save──►┌───────────────────┐──load──► Engine::resume
//!                       │  CheckpointStore  │
//!                       └───────────────────┘
//! ```

pub mod checkpoint;
pub mod context;

pub use checkpoint::{CheckpointStore, InMemoryCheckpointStore};
pub use context::{ContextStore, InMemoryContextStore};
