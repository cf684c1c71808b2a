use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What initiated a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingTrigger {
    Manual,
    Auto,
}

impl TrainingTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            TrainingTrigger::Manual => "manual",
            TrainingTrigger::Auto => "auto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(TrainingTrigger::Manual),
            "auto" => Some(TrainingTrigger::Auto),
            _ => None,
        }
    }
}

/// Held-out metrics for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of held-out samples with this true category.
    pub support: usize,
}

/// Full evaluation report from a held-out split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub per_category: Vec<CategoryMetrics>,
    pub accuracy: f64,
    pub macro_f1: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Score attached to a model version. Numeric scores exist only when the
/// training set met the evaluation minimum; below that the version carries an
/// explicit insufficient-data marker instead of a misleading number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelScore {
    Evaluated { accuracy: f64, macro_f1: f64 },
    InsufficientData,
}

impl ModelScore {
    pub fn accuracy(self) -> Option<f64> {
        match self {
            ModelScore::Evaluated { accuracy, .. } => Some(accuracy),
            ModelScore::InsufficientData => None,
        }
    }

    pub fn macro_f1(self) -> Option<f64> {
        match self {
            ModelScore::Evaluated { macro_f1, .. } => Some(macro_f1),
            ModelScore::InsufficientData => None,
        }
    }

    pub fn is_evaluated(self) -> bool {
        matches!(self, ModelScore::Evaluated { .. })
    }
}

/// Immutable lineage record for one training run. Append-only, ordered by
/// creation time; "latest" is the most recent row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    pub version: String,
    /// Path of the versioned artifact; absent when the run produced no model
    /// (zero training samples).
    pub artifact_path: Option<String>,
    /// Labeled messages available when the run started.
    pub num_samples: usize,
    pub num_categories: usize,
    pub score: ModelScore,
    pub report: Option<EvaluationReport>,
    pub trigger: TrainingTrigger,
    pub created_at: DateTime<Utc>,
}
