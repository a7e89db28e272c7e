//! Named specialist factories.
//!
//! The registry maps each specialist name to a factory, so every run gets
//! fresh instances and no branch shares mutable state with another.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use council_common::Specialist;
use council_llm::LlmClient;
use tracing::debug;

use crate::advisor::AdvisorSpecialist;
use crate::advisors;

/// Constructs a fresh specialist instance.
pub type SpecialistFactory = Arc<dyn Fn() -> Arc<dyn Specialist> + Send + Sync>;

/// Names are unique and iterate in sorted order.
#[derive(Clone, Default)]
pub struct SpecialistRegistry {
    factories: BTreeMap<String, SpecialistFactory>,
}

impl SpecialistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the five default advisors, all sharing
    /// `llm`.
    pub fn with_default_advisors(llm: Arc<dyn LlmClient>) -> Self {
        let mut registry = Self::new();
        for profile in advisors::default_profiles() {
            let llm = llm.clone();
            let name = profile.name.clone();
            registry.register(name, move || {
                Arc::new(AdvisorSpecialist::new(profile.clone(), llm.clone())) as Arc<dyn Specialist>
            });
        }
        registry
    }

    /// Register a factory under `name`. Returns the factory it replaced, if any.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Option<SpecialistFactory>
    where
        F: Fn() -> Arc<dyn Specialist> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(specialist = %name, "Registering specialist");
        self.factories.insert(name, Arc::new(factory))
    }

    /// Build a fresh instance of `name`.
    pub fn construct(&self, name: &str) -> Option<Arc<dyn Specialist>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Description of `name`, read from a freshly constructed instance.
    pub fn describe(&self, name: &str) -> Option<String> {
        self.construct(name).map(|s| s.description().to_string())
    }
}

impl fmt::Debug for SpecialistRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialistRegistry")
            .field("specialists", &self.names())
            .finish()
    }
}
