//! ClassifierEngine — batch classification of unlabeled messages with
//! uncertainty flagging.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use sift_core::config::ClassifierConfig;
use sift_core::errors::SiftResult;
use sift_core::models::{EmailMessage, Label, LabelSource};
use sift_core::traits::IMessageStore;
use sift_training::ModelArtifact;

use crate::uncertainty::UncertaintyScore;

/// One scored prediction.
#[derive(Debug, Clone)]
pub struct Classification {
    pub message_id: i64,
    pub category: String,
    pub confidence: f64,
    pub uncertainty: UncertaintyScore,
}

/// Result of one classification pass.
#[derive(Debug, Clone, Default)]
pub struct ClassifyReport {
    pub classified: usize,
    pub uncertain_ids: Vec<i64>,
}

/// Scores unlabeled messages with the latest model artifact.
pub struct ClassifierEngine {
    store: Arc<dyn IMessageStore>,
    config: ClassifierConfig,
    model_dir: PathBuf,
}

impl ClassifierEngine {
    pub fn new(store: Arc<dyn IMessageStore>, config: ClassifierConfig, model_dir: PathBuf) -> Self {
        Self {
            store,
            config,
            model_dir,
        }
    }

    /// Classify all unlabeled messages in batches, persisting every
    /// prediction as a `source = model` label, and collect the ids of
    /// uncertain predictions.
    ///
    /// With no trained artifact on disk this returns an empty report rather
    /// than an error; callers must treat zero throughput as "skip, do not
    /// retrain". The batch loop is resumable: labels are upserted per item,
    /// so a stopped run picks up exactly where unlabeled messages remain.
    pub fn classify_and_flag(&self) -> SiftResult<ClassifyReport> {
        let Some(artifact) = ModelArtifact::load_latest(&self.model_dir)? else {
            error!(
                model_dir = %self.model_dir.display(),
                "no trained model artifact; skipping classification for this cycle"
            );
            return Ok(ClassifyReport::default());
        };

        let mut report = ClassifyReport::default();

        loop {
            let batch = self.store.unlabeled_messages(self.config.batch_size)?;
            if batch.is_empty() {
                break;
            }

            info!(batch = batch.len(), "classifying batch");
            for classification in self.classify_batch(&artifact, &batch) {
                self.store.upsert_label(&Label::new(
                    classification.message_id,
                    classification.category.clone(),
                    classification.confidence,
                    LabelSource::Model,
                ))?;
                report.classified += 1;

                if classification.uncertainty.is_uncertain(
                    self.config.margin_threshold,
                    self.config.confidence_threshold,
                ) {
                    report.uncertain_ids.push(classification.message_id);
                }
            }
        }

        info!(
            classified = report.classified,
            uncertain = report.uncertain_ids.len(),
            "classification complete"
        );
        Ok(report)
    }

    /// Score one batch without persisting anything.
    pub fn classify_batch(
        &self,
        artifact: &ModelArtifact,
        messages: &[EmailMessage],
    ) -> Vec<Classification> {
        messages
            .iter()
            .map(|message| {
                let (category, probabilities) = artifact.predict(&message.feature_text());
                let uncertainty = UncertaintyScore::from_probabilities(&probabilities);
                Classification {
                    message_id: message.id,
                    category: category.to_string(),
                    confidence: uncertainty.max_prob,
                    uncertainty,
                }
            })
            .collect()
    }
}
