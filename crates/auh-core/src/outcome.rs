//! Per-package terminal outcomes and their batch-level summary.

use crate::backend::Acquired;
use crate::error::{InvalidIdentifier, PipelineError};

/// Terminal state of one requested package.
#[derive(Debug)]
pub enum Outcome {
    /// The package is present afterwards.
    Succeeded(Acquired),
    /// The pipeline stopped with an error.
    Failed(PipelineError),
    /// The name was rejected before any pipeline ran.
    Invalid(InvalidIdentifier),
}

impl Outcome {
    /// Whether this outcome counts towards `succeeded`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Collects outcomes as units terminate.
///
/// Every request must be recorded exactly once; the counts in the final
/// [`BatchResult`] always sum to the number of `record` calls.
#[derive(Debug, Default)]
pub struct OutcomeAggregator {
    succeeded: usize,
    failed: usize,
    invalid: usize,
}

impl OutcomeAggregator {
    /// Empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one terminal outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Succeeded(_) => self.succeeded += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Invalid(_) => self.invalid += 1,
        }
    }

    /// Count a success that did not come from an acquisition pipeline.
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Fold another aggregator's counts into this one.
    pub fn merge(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.invalid += other.invalid;
    }

    /// Freeze the counts.
    pub fn finish(self) -> BatchResult {
        BatchResult {
            succeeded: self.succeeded,
            failed: self.failed,
            invalid: self.invalid,
        }
    }
}

/// Final counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Packages installed or already present.
    pub succeeded: usize,
    /// Packages whose pipeline failed.
    pub failed: usize,
    /// Names rejected by validation.
    pub invalid: usize,
}

impl BatchResult {
    /// No pipeline failed and no request was rejected.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.invalid == 0
    }

    /// Process exit status for the batch.
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }

    /// Number reported to the operator in the summary line.
    pub fn problem_count(&self) -> usize {
        self.failed + self.invalid
    }

    /// Number of requests the batch saw.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.invalid
    }

    /// Summary line, or `None` when nothing went wrong.
    pub fn summary(&self) -> Option<String> {
        match self.problem_count() {
            0 => None,
            1 => Some("1 package failed".to_string()),
            n => Some(format!("{n} packages failed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid() -> Outcome {
        Outcome::Invalid(InvalidIdentifier {
            name: "bad name".into(),
            reason: "contains whitespace",
        })
    }

    #[test]
    fn test_empty_batch_succeeds() {
        let result = OutcomeAggregator::new().finish();
        assert!(result.is_success());
        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.summary(), None);
    }

    #[test]
    fn test_counts_each_outcome_once() {
        let mut agg = OutcomeAggregator::new();
        agg.record(&Outcome::Succeeded(Acquired::Installed));
        agg.record(&Outcome::Succeeded(Acquired::AlreadySatisfied));
        agg.record(&Outcome::Failed(PipelineError::NotFound("x".into())));
        agg.record(&invalid());

        let result = agg.finish();
        assert_eq!(
            result,
            BatchResult {
                succeeded: 2,
                failed: 1,
                invalid: 1
            }
        );
        assert_eq!(result.total(), 4);
        assert_eq!(result.problem_count(), 2);
        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.summary().as_deref(), Some("2 packages failed"));
    }

    #[test]
    fn test_invalid_alone_fails_the_batch() {
        let mut agg = OutcomeAggregator::new();
        agg.record(&invalid());
        let result = agg.finish();
        assert!(!result.is_success());
        assert_eq!(result.summary().as_deref(), Some("1 package failed"));
    }

    #[test]
    fn test_merge() {
        let mut a = OutcomeAggregator::new();
        a.record(&invalid());
        let mut b = OutcomeAggregator::new();
        b.record(&Outcome::Succeeded(Acquired::Installed));
        a.merge(b);
        assert_eq!(a.finish().total(), 2);
    }
}
