//! Adapter for specialists backed by synchronous providers.
//!
//! A [`BlockingSpecialist`] does its work on the calling thread. Wrapping it
//! in [`Blocking`] moves each call onto tokio's blocking pool so parallel
//! branches keep running side by side.

use std::sync::Arc;

use async_trait::async_trait;
use council_common::{CouncilError, Result, Specialist};

/// Synchronous counterpart of [`Specialist`].
pub trait BlockingSpecialist: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn decide(&self, prompt: &str) -> Result<bool>;
    fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct Blocking<T: BlockingSpecialist> {
    inner: Arc<T>,
}

impl<T: BlockingSpecialist> Blocking<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

#[async_trait]
impl<T: BlockingSpecialist> Specialist for Blocking<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    async fn decide(&self, prompt: &str) -> Result<bool> {
        let inner = self.inner.clone();
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || inner.decide(&prompt))
            .await
            .map_err(|e| CouncilError::Decision(format!("{}: task failed: {}", self.name(), e)))?
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let inner = self.inner.clone();
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || inner.generate(&prompt))
            .await
            .map_err(|e| CouncilError::Generation(format!("{}: task failed: {}", self.name(), e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct Sleeper {
        delay: Duration,
        panic_on_generate: bool,
    }

    impl BlockingSpecialist for Sleeper {
        fn name(&self) -> &str {
            "sleeper"
        }
        fn description(&self) -> &str {
            "blocks the thread"
        }
        fn decide(&self, _prompt: &str) -> Result<bool> {
            std::thread::sleep(self.delay);
            Ok(true)
        }
        fn generate(&self, prompt: &str) -> Result<String> {
            if self.panic_on_generate {
                panic!("provider crashed");
            }
            std::thread::sleep(self.delay);
            Ok(format!("slept on {prompt}"))
        }
    }

    #[tokio::test]
    async fn calls_run_on_blocking_pool() {
        let specialist = Blocking::new(Sleeper {
            delay: Duration::from_millis(5),
            panic_on_generate: false,
        });

        assert!(specialist.decide("q").await.unwrap());
        assert_eq!(specialist.generate("q").await.unwrap(), "slept on q");
        assert_eq!(specialist.name(), "sleeper");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_calls_overlap() {
        let a = Blocking::new(Sleeper {
            delay: Duration::from_millis(200),
            panic_on_generate: false,
        });
        let b = Blocking::new(Sleeper {
            delay: Duration::from_millis(200),
            panic_on_generate: false,
        });

        let start = Instant::now();
        let (ra, rb) = tokio::join!(a.generate("a"), b.generate("b"));
        ra.unwrap();
        rb.unwrap();

        assert!(start.elapsed() < Duration::from_millis(350));
    }

    #[tokio::test]
    async fn panic_becomes_generation_error() {
        let specialist = Blocking::new(Sleeper {
            delay: Duration::ZERO,
            panic_on_generate: true,
        });

        let err = specialist.generate("q").await.unwrap_err();
        assert!(matches!(err, CouncilError::Generation(_)));
    }
}
