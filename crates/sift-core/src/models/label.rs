use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::confidence::Confidence;

/// Where a label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// A human assigned the label.
    Manual,
    /// The bootstrap LLM labeler assigned the label.
    Llm,
    /// The trained classifier assigned the label.
    Model,
}

impl LabelSource {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelSource::Manual => "manual",
            LabelSource::Llm => "llm",
            LabelSource::Model => "model",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(LabelSource::Manual),
            "llm" => Some(LabelSource::Llm),
            "model" => Some(LabelSource::Model),
            _ => None,
        }
    }
}

/// A classification annotation on exactly one message. At most one label per
/// message; a new classification replaces the prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub message_id: i64,
    pub category: String,
    pub confidence: Confidence,
    pub source: LabelSource,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub fn new(message_id: i64, category: impl Into<String>, confidence: f64, source: LabelSource) -> Self {
        Self {
            message_id,
            category: category.into(),
            confidence: Confidence::new(confidence),
            source,
            created_at: Utc::now(),
        }
    }
}
