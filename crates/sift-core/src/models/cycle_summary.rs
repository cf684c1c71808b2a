use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured report produced by every evolution cycle, including fully
/// degraded ones, so operators can tell "nothing to do" from "something
/// failed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    pub timestamp: DateTime<Utc>,
    /// New messages stored during ingestion.
    pub ingested: usize,
    /// Messages classified this cycle.
    pub classified: usize,
    /// Classified messages flagged as uncertain.
    pub uncertain: usize,
    /// Category proposals persisted this cycle.
    pub proposals: usize,
    pub retrained: bool,
    pub accuracy: Option<f64>,
    pub previous_accuracy: Option<f64>,
    /// Set when the new model's accuracy dropped past the regression
    /// threshold. Surfaced only; the system never rolls back on its own.
    pub accuracy_warning: bool,
    /// Per-stage skip/failure notes, in stage order.
    pub notes: Vec<String>,
}

impl CycleSummary {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            ingested: 0,
            classified: 0,
            uncertain: 0,
            proposals: 0,
            retrained: false,
            accuracy: None,
            previous_accuracy: None,
            accuracy_warning: false,
            notes: Vec::new(),
        }
    }

    /// Accuracy delta against the previous version, when both are known.
    pub fn accuracy_delta(&self) -> Option<f64> {
        match (self.accuracy, self.previous_accuracy) {
            (Some(new), Some(prev)) => Some(new - prev),
            _ => None,
        }
    }
}

impl Default for CycleSummary {
    fn default() -> Self {
        Self::new()
    }
}
