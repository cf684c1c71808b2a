//! EvolutionEngine — one full cycle of the closed feedback loop.

use std::sync::Arc;

use tracing::{error, info, warn};

use sift_classifier::{ClassifierEngine, ClassifyReport};
use sift_core::config::EvolutionConfig;
use sift_core::errors::SiftResult;
use sift_core::models::{CycleSummary, ModelVersion, TrainingTrigger};
use sift_core::traits::{IMailSource, IMessageStore};
use sift_discovery::DiscoveryEngine;
use sift_training::{TrainingEngine, TrainingOutcome};

use crate::stage::StageOutcome;

/// True when the new accuracy dropped more than `threshold` below the
/// previous one. Strict: a drop of exactly `threshold` does not fire.
pub fn accuracy_regressed(new: f64, previous: f64, threshold: f64) -> bool {
    new - previous < -threshold
}

/// The evolution orchestrator. Strictly single-flight: one cycle at a time,
/// every stage sequential and blocking.
pub struct EvolutionEngine {
    store: Arc<dyn IMessageStore>,
    /// Absent when no ingestion collaborator is wired in; the cycle then
    /// classifies the previously ingested backlog only.
    mail: Option<Arc<dyn IMailSource>>,
    classifier: ClassifierEngine,
    discovery: DiscoveryEngine,
    training: TrainingEngine,
    config: EvolutionConfig,
    /// Uncertain-candidate floor below which discovery is not entered.
    discovery_minimum: usize,
}

impl EvolutionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn IMessageStore>,
        mail: Option<Arc<dyn IMailSource>>,
        classifier: ClassifierEngine,
        discovery: DiscoveryEngine,
        training: TrainingEngine,
        config: EvolutionConfig,
        discovery_minimum: usize,
    ) -> Self {
        Self {
            store,
            mail,
            classifier,
            discovery,
            training,
            config,
            discovery_minimum,
        }
    }

    /// Run one complete evolution cycle. Always returns a summary, even a
    /// fully degraded one, so operators can tell "nothing to do" from
    /// "something failed".
    pub fn run_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::new();
        info!("starting evolution cycle");

        // --- INGEST ---
        match self.ingest() {
            StageOutcome::Completed(count) => {
                summary.ingested = count;
                info!(ingested = count, "ingestion complete");
            }
            StageOutcome::Skipped { reason } => {
                info!(reason = %reason, "ingestion skipped");
                summary.notes.push(format!("ingest skipped: {reason}"));
            }
            StageOutcome::Failed { error } => {
                error!(error = %error, "ingestion failed; continuing with existing backlog");
                summary.notes.push(format!("ingest failed: {error}"));
            }
        }

        // --- CLASSIFY_AND_FLAG ---
        let uncertain_ids = match StageOutcome::from_result(self.classifier.classify_and_flag()) {
            StageOutcome::Completed(ClassifyReport {
                classified,
                uncertain_ids,
            }) => {
                summary.classified = classified;
                summary.uncertain = uncertain_ids.len();
                uncertain_ids
            }
            StageOutcome::Skipped { reason } => {
                summary.notes.push(format!("classify skipped: {reason}"));
                Vec::new()
            }
            StageOutcome::Failed { error } => {
                error!(error = %error, "classification failed");
                summary.notes.push(format!("classify failed: {error}"));
                Vec::new()
            }
        };

        // --- DISCOVER ---
        if uncertain_ids.len() >= self.discovery_minimum {
            match StageOutcome::from_result(self.discovery.discover(&uncertain_ids)) {
                StageOutcome::Completed(report) => {
                    summary.proposals = report.proposals.len();
                    info!(
                        clusters = report.clusters,
                        proposals = report.proposals.len(),
                        "discovery complete"
                    );
                }
                StageOutcome::Skipped { reason } => {
                    summary.notes.push(format!("discovery skipped: {reason}"));
                }
                StageOutcome::Failed { error } => {
                    error!(error = %error, "category discovery failed");
                    summary.notes.push(format!("discovery failed: {error}"));
                }
            }
        } else {
            info!(
                uncertain = uncertain_ids.len(),
                minimum = self.discovery_minimum,
                "not enough uncertain messages; skipping discovery"
            );
            summary.notes.push(format!(
                "discovery skipped: {} uncertain, need {}",
                uncertain_ids.len(),
                self.discovery_minimum
            ));
        }

        // --- RETRAIN + COMPARE ---
        self.maybe_retrain(&mut summary);

        summary
    }

    fn ingest(&self) -> StageOutcome<usize> {
        let Some(mail) = &self.mail else {
            return StageOutcome::skipped("no mail source configured");
        };

        let run = || -> SiftResult<usize> {
            let accounts = mail.authenticated_accounts()?;
            if accounts.is_empty() {
                warn!("no authenticated accounts found");
                return Ok(0);
            }
            let mut total = 0usize;
            for account in &accounts {
                let since = self.store.latest_internal_date(&account.address)?;
                let messages = mail.fetch_new(account, since)?;
                let mut stored = 0usize;
                for message in &messages {
                    if self.store.insert_message(message)? {
                        stored += 1;
                    }
                }
                info!(account = %account.address, fetched = messages.len(), stored, "account ingested");
                total += stored;
            }
            Ok(total)
        };
        StageOutcome::from_result(run())
    }

    /// Retraining is gated on net new supervision since the previous
    /// version, not on wall clock, so idle periods trigger no work.
    fn maybe_retrain(&self, summary: &mut CycleSummary) {
        let previous: Option<ModelVersion> = match self.store.latest_model_version() {
            Ok(previous) => previous,
            Err(error) => {
                error!(%error, "could not read model lineage; skipping retrain");
                summary.notes.push(format!("retrain failed: {error}"));
                return;
            }
        };
        let current_labeled = match self.store.labeled_count() {
            Ok(count) => count,
            Err(error) => {
                error!(%error, "could not count labels; skipping retrain");
                summary.notes.push(format!("retrain failed: {error}"));
                return;
            }
        };

        let previous_samples = previous.as_ref().map(|v| v.num_samples).unwrap_or(0);
        let new_labels = current_labeled.saturating_sub(previous_samples);

        if new_labels < self.config.min_new_labels_for_retrain {
            info!(
                new_labels,
                threshold = self.config.min_new_labels_for_retrain,
                "not enough new labels for retrain"
            );
            summary.notes.push(format!(
                "retrain skipped: {new_labels} new labels, need {}",
                self.config.min_new_labels_for_retrain
            ));
            return;
        }

        info!(
            new_labels,
            threshold = self.config.min_new_labels_for_retrain,
            "retraining with accumulated labels"
        );
        match StageOutcome::from_result(self.training.train_and_version(TrainingTrigger::Auto)) {
            StageOutcome::Completed(TrainingOutcome { version, score, .. }) => {
                summary.retrained = true;
                summary.accuracy = score.accuracy();
                self.compare(summary, previous.as_ref(), &version);
            }
            StageOutcome::Skipped { reason } => {
                summary.notes.push(format!("retrain skipped: {reason}"));
            }
            StageOutcome::Failed { error } => {
                error!(error = %error, "retraining failed");
                summary.notes.push(format!("retrain failed: {error}"));
            }
        }
    }

    /// Compare new vs. previous accuracy. A material drop is surfaced as a
    /// warning; the system never rolls back on its own.
    fn compare(&self, summary: &mut CycleSummary, previous: Option<&ModelVersion>, version: &str) {
        let Some(previous) = previous else {
            return;
        };
        summary.previous_accuracy = previous.score.accuracy();

        let (Some(new), Some(old)) = (summary.accuracy, summary.previous_accuracy) else {
            return;
        };
        if accuracy_regressed(new, old, self.config.regression_threshold) {
            summary.accuracy_warning = true;
            warn!(
                version,
                previous_accuracy = old,
                accuracy = new,
                drop = old - new,
                "accuracy dropped past the regression threshold; check training data"
            );
        } else {
            info!(
                version,
                accuracy = new,
                change = new - old,
                "model accuracy compared against previous version"
            );
        }
    }
}
