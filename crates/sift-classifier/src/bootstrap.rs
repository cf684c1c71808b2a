//! LLM bootstrap labeling: seeds training data by labeling unlabeled
//! messages in batches through an external label oracle. Labels land with
//! `source = llm` so later audits can tell them from human and model labels.

use std::sync::Arc;

use tracing::{info, warn};

use sift_core::constants::SAMPLE_BODY_PREVIEW_CHARS;
use sift_core::errors::SiftResult;
use sift_core::models::{Label, LabelSource};
use sift_core::taxonomy::Taxonomy;
use sift_core::traits::{ILabelOracle, IMessageStore, LabelRequestItem};

/// Result of one bootstrap run.
#[derive(Debug, Clone, Default)]
pub struct BootstrapReport {
    pub labeled: usize,
    /// Votes dropped because the category was not in the taxonomy, plus
    /// messages the oracle returned no vote for.
    pub skipped: usize,
}

pub struct BootstrapLabeler {
    store: Arc<dyn IMessageStore>,
    oracle: Arc<dyn ILabelOracle>,
    taxonomy: Taxonomy,
    batch_size: usize,
}

impl BootstrapLabeler {
    pub fn new(
        store: Arc<dyn IMessageStore>,
        oracle: Arc<dyn ILabelOracle>,
        taxonomy: Taxonomy,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            oracle,
            taxonomy,
            batch_size: batch_size.max(1),
        }
    }

    /// Label unlabeled messages until none remain. With `clear_existing`,
    /// all labels are removed first (re-labeling under a new taxonomy).
    pub fn run(&self, clear_existing: bool) -> SiftResult<BootstrapReport> {
        if clear_existing {
            let removed = self.store.clear_labels()?;
            info!(removed, "cleared existing labels before bootstrap");
        }

        let mut report = BootstrapReport::default();

        loop {
            let batch = self.store.unlabeled_messages(self.batch_size)?;
            if batch.is_empty() {
                break;
            }

            let items: Vec<LabelRequestItem> = batch
                .iter()
                .map(|message| LabelRequestItem {
                    message_id: message.id,
                    from_addr: message.from_addr.clone(),
                    subject: message.subject.clone(),
                    body_preview: message.body_preview(SAMPLE_BODY_PREVIEW_CHARS),
                })
                .collect();

            let votes = self.oracle.label_batch(&self.taxonomy, &items)?;
            let mut labeled_this_batch = 0usize;

            for vote in votes {
                if !batch.iter().any(|m| m.id == vote.message_id) {
                    warn!(message_id = vote.message_id, "vote for a message outside the batch");
                    report.skipped += 1;
                    continue;
                }
                if !self.taxonomy.contains(&vote.category) {
                    warn!(
                        category = %vote.category,
                        message_id = vote.message_id,
                        "oracle proposed a category outside the taxonomy"
                    );
                    report.skipped += 1;
                    continue;
                }
                self.store.upsert_label(&Label::new(
                    vote.message_id,
                    vote.category,
                    vote.confidence,
                    LabelSource::Llm,
                ))?;
                report.labeled += 1;
                labeled_this_batch += 1;
            }

            // A batch that produced no usable votes would refetch the same
            // messages forever; stop and leave them for a later run.
            if labeled_this_batch == 0 {
                warn!(batch = batch.len(), "no usable votes for this batch; stopping");
                report.skipped += batch.len();
                break;
            }
        }

        info!(
            labeled = report.labeled,
            skipped = report.skipped,
            "bootstrap labeling complete"
        );
        Ok(report)
    }
}
