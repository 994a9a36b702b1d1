//! Bounded-concurrency task scheduler.
//!
//! Admits one unit per package while fewer than `max_concurrent` are
//! outstanding, then waits for any unit to finish and refills the pool:
//!
//! ```text
//! loop:
//!   while queue not empty and running < cap: spawn next
//!   if running == 0: break
//!   reap one, record its outcome
//! ```
//!
//! Units are independent tokio tasks. Each one owns clones of the shared,
//! immutable handles (backend, reporter) and hands its result back only
//! through its join handle. A unit that panics is reaped like any other and
//! counted as a failure; its siblings keep running.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

use crate::backend::{Acquired, Backend};
use crate::config::DEFAULT_MAX_CONCURRENT;
use crate::error::PipelineError;
use crate::name::PackageName;
use crate::outcome::{Outcome, OutcomeAggregator};
use crate::reporter::Reporter;

type UnitResult = (PackageName, Result<Acquired, PipelineError>);

/// Runs one acquisition unit per package, at most `max_concurrent` at once.
#[derive(Debug, Clone, Copy)]
pub struct TaskScheduler {
    max_concurrent: usize,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT)
    }
}

impl TaskScheduler {
    /// Create a scheduler; a cap of zero is raised to one.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Effective cap, at least one.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run every package through `backend` and collect the outcomes.
    ///
    /// Completion order is whatever order the pipelines finish in.
    pub async fn run(
        &self,
        names: Vec<PackageName>,
        backend: Arc<dyn Backend>,
        reporter: Arc<dyn Reporter>,
    ) -> OutcomeAggregator {
        let mut outcomes = OutcomeAggregator::new();
        let mut queue = names.into_iter();
        let mut set: JoinSet<UnitResult> = JoinSet::new();
        let mut in_flight: HashMap<Id, PackageName> = HashMap::new();

        loop {
            while set.len() < self.max_concurrent {
                let Some(name) = queue.next() else { break };
                let backend = backend.clone();
                let reporter = reporter.clone();
                let unit_name = name.clone();
                let handle = set.spawn(async move {
                    let result = backend.acquire(&unit_name, reporter.as_ref()).await;
                    (unit_name, result)
                });
                debug!(package = %name, running = set.len(), "admitted");
                in_flight.insert(handle.id(), name);
            }

            let Some(joined) = set.join_next_with_id().await else {
                break;
            };

            let (name, outcome) = match joined {
                Ok((id, (name, result))) => {
                    in_flight.remove(&id);
                    let outcome = result.map_or_else(Outcome::Failed, Outcome::Succeeded);
                    (name.to_string(), outcome)
                }
                Err(join_error) => {
                    let name = in_flight
                        .remove(&join_error.id())
                        .map_or_else(|| "<unknown>".to_string(), |n| n.to_string());
                    warn!(package = %name, error = %join_error, "unit terminated abnormally");
                    let reason = if join_error.is_panic() {
                        "task panicked".to_string()
                    } else {
                        join_error.to_string()
                    };
                    let outcome = Outcome::Failed(PipelineError::Aborted {
                        name: name.clone(),
                        reason,
                    });
                    (name, outcome)
                }
            };

            report(reporter.as_ref(), &name, &outcome);
            outcomes.record(&outcome);
        }

        outcomes
    }
}

fn report(reporter: &dyn Reporter, name: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Succeeded(Acquired::Installed) => reporter.done(name, "installed"),
        Outcome::Succeeded(Acquired::AlreadySatisfied) => {
            reporter.skipped(name, "already installed");
        }
        Outcome::Failed(e) => {
            warn!(package = %name, error = %e, "pipeline failed");
            reporter.failed(name, &e.to_string());
        }
        Outcome::Invalid(e) => reporter.failed(name, &e.to_string()),
    }
}
