//! Tagged per-stage results. The orchestrator pattern-matches on these
//! instead of suppressing exceptions.

use sift_core::errors::SiftResult;

/// Outcome of one pipeline stage.
#[derive(Debug, Clone)]
pub enum StageOutcome<T> {
    /// The stage ran and produced data.
    Completed(T),
    /// The stage decided not to run (gate not met, collaborator absent).
    Skipped { reason: String },
    /// The stage ran and failed; the cycle continues without its output.
    Failed { error: String },
}

impl<T> StageOutcome<T> {
    pub fn skipped(reason: impl Into<String>) -> Self {
        StageOutcome::Skipped {
            reason: reason.into(),
        }
    }

    /// Fold a fallible stage body into an outcome.
    pub fn from_result(result: SiftResult<T>) -> Self {
        match result {
            Ok(value) => StageOutcome::Completed(value),
            Err(error) => StageOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::errors::{SiftError, TrainingError};

    #[test]
    fn from_result_folds_both_arms() {
        let ok: StageOutcome<u32> = StageOutcome::from_result(Ok(7));
        assert!(ok.is_completed());

        let err: StageOutcome<u32> =
            StageOutcome::from_result(Err(SiftError::Training(TrainingError::NoTrainingData)));
        assert!(matches!(err, StageOutcome::Failed { .. }));
    }
}
