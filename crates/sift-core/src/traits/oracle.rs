use serde::{Deserialize, Serialize};

use crate::errors::SiftResult;
use crate::taxonomy::Taxonomy;

/// A representative message shown to the naming oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMessage {
    pub from_addr: String,
    pub subject: String,
    pub body_preview: String,
}

/// Everything the naming oracle sees about one candidate cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingRequest {
    pub existing_categories: Vec<String>,
    pub cluster_size: usize,
    pub top_terms: Vec<String>,
    /// Distribution of current labels among cluster members.
    pub label_distribution: Vec<(String, usize)>,
    pub samples: Vec<SampleMessage>,
}

/// Oracle decision for a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingVerdict {
    NewCategory {
        name: String,
        description: String,
        reasoning: String,
    },
    NoNewCategory {
        reasoning: String,
    },
}

/// External text-generation collaborator that proposes category names.
/// Implementations must surface malformed output as an error; callers treat
/// any error as "no proposal for this cluster".
pub trait INamingOracle: Send + Sync {
    fn propose(&self, request: &NamingRequest) -> SiftResult<NamingVerdict>;
}

/// One message submitted for bootstrap labeling.
#[derive(Debug, Clone)]
pub struct LabelRequestItem {
    pub message_id: i64,
    pub from_addr: String,
    pub subject: String,
    pub body_preview: String,
}

/// One label decision returned by the bootstrap labeler.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelVote {
    pub message_id: i64,
    pub category: String,
    pub confidence: f64,
}

/// External collaborator that labels message batches against the taxonomy,
/// used to bootstrap training data.
pub trait ILabelOracle: Send + Sync {
    fn label_batch(
        &self,
        taxonomy: &Taxonomy,
        items: &[LabelRequestItem],
    ) -> SiftResult<Vec<LabelVote>>;
}
