//! Ordered "first success wins" combinator.
//!
//! A [`FallbackChain`] holds named candidates that are awaited strictly one
//! after another. A candidate that errors or yields an empty result is logged
//! and skipped; the first non-empty result is returned and later candidates
//! never run. There is no retry, racing or timeout at this level.

use futures::future::BoxFuture;
use std::future::Future;
use tracing::{debug, info, warn};

/// Decides whether a successful result should end the chain.
pub trait Outcome {
    fn is_empty_outcome(&self) -> bool;
}

impl<T> Outcome for Vec<T> {
    fn is_empty_outcome(&self) -> bool {
        self.is_empty()
    }
}

impl Outcome for String {
    fn is_empty_outcome(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T: Outcome> Outcome for Option<T> {
    fn is_empty_outcome(&self) -> bool {
        self.as_ref().is_none_or(Outcome::is_empty_outcome)
    }
}

type Producer<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, anyhow::Result<T>> + Send + 'a>;

struct Candidate<'a, T> {
    name: String,
    produce: Producer<'a, T>,
}

pub struct FallbackChain<'a, T> {
    label: &'static str,
    candidates: Vec<Candidate<'a, T>>,
}

impl<'a, T> FallbackChain<'a, T>
where
    T: Outcome + Send + 'a,
{
    /// `label` names the chain in logs and metrics, e.g. "search".
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            candidates: Vec::new(),
        }
    }

    /// Appends a candidate. Candidates run in insertion order.
    #[must_use]
    pub fn then<F, Fut>(mut self, name: impl Into<String>, produce: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'a,
    {
        self.candidates.push(Candidate {
            name: name.into(),
            produce: Box::new(move || Box::pin(produce())),
        });
        self
    }

    /// Runs candidates in order and returns the first non-empty success.
    pub async fn run(self) -> Option<T> {
        let label = self.label;

        for Candidate { name, produce } in self.candidates {
            metrics::counter!("fallback_attempts_total", "chain" => label, "candidate" => name.clone())
                .increment(1);

            match produce().await {
                Ok(value) if !value.is_empty_outcome() => {
                    info!(chain = label, candidate = %name, "Fallback candidate succeeded");
                    return Some(value);
                }
                Ok(_) => {
                    debug!(chain = label, candidate = %name, "Fallback candidate returned nothing");
                }
                Err(e) => {
                    warn!(chain = label, candidate = %name, error = %e, "Fallback candidate failed");
                }
            }
        }

        debug!(chain = label, "Every fallback candidate was exhausted");
        None
    }

    /// Like [`run`](Self::run) but yields `T::default()` when nothing succeeds.
    pub async fn run_or_default(self) -> T
    where
        T: Default,
    {
        self.run().await.unwrap_or_default()
    }

    /// Like [`run`](Self::run) but computes a local value when nothing succeeds.
    pub async fn run_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self.run().await {
            Some(value) => value,
            None => fallback(),
        }
    }
}
