//! DiscoveryEngine — clustering, homogeneity filtering, oracle naming, and
//! proposal review transitions.

use std::sync::Arc;

use tracing::{info, warn};

use sift_core::config::DiscoveryConfig;
use sift_core::constants::SAMPLE_BODY_PREVIEW_CHARS;
use sift_core::errors::SiftResult;
use sift_core::models::{CategoryProposal, NewProposal, ProposalStatus};
use sift_core::taxonomy::Taxonomy;
use sift_core::traits::{IMessageStore, INamingOracle, NamingRequest, NamingVerdict, SampleMessage};
use sift_text::sparse::pairwise_cosine_distances;
use sift_text::{TfidfConfig, TfidfVectorizer};

use crate::algorithms::dbscan::{dbscan, DbscanParams};
use crate::algorithms::kmeans::{kmeans, KmeansParams};
use crate::algorithms::ClusterResult;
use crate::profile::{build_profile, ClusterProfile};

/// Result of one discovery pass.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// Candidates that entered clustering.
    pub candidates: usize,
    /// Clusters surviving the size filter.
    pub clusters: usize,
    /// Names of the proposals persisted this pass.
    pub proposals: Vec<String>,
}

/// The category discovery engine.
pub struct DiscoveryEngine {
    store: Arc<dyn IMessageStore>,
    /// Absent when no oracle is configured; clustering still runs, but no
    /// proposals are recorded.
    oracle: Option<Arc<dyn INamingOracle>>,
    taxonomy: Taxonomy,
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    pub fn new(
        store: Arc<dyn IMessageStore>,
        oracle: Option<Arc<dyn INamingOracle>>,
        taxonomy: Taxonomy,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            taxonomy,
            config,
        }
    }

    /// Full discovery pass over a set of uncertain message ids: cluster,
    /// filter, name, persist. Oracle failures drop only the affected
    /// cluster's proposal, never the pass.
    pub fn discover(&self, uncertain_ids: &[i64]) -> SiftResult<DiscoveryReport> {
        let profiles = self.cluster_candidates(uncertain_ids)?;
        let mut report = DiscoveryReport {
            candidates: uncertain_ids.len(),
            clusters: profiles.len(),
            proposals: Vec::new(),
        };
        if profiles.is_empty() {
            return Ok(report);
        }
        report.proposals = self.propose(&profiles)?;
        Ok(report)
    }

    /// Cluster uncertain messages and profile the surviving clusters.
    ///
    /// Requires at least twice the minimum cluster size in candidates;
    /// clustering fewer points is unreliable and wastes oracle calls.
    pub fn cluster_candidates(&self, uncertain_ids: &[i64]) -> SiftResult<Vec<ClusterProfile>> {
        if uncertain_ids.len() < self.config.min_candidates() {
            info!(
                candidates = uncertain_ids.len(),
                minimum = self.config.min_candidates(),
                "not enough uncertain messages; skipping discovery"
            );
            return Ok(Vec::new());
        }

        let candidates = self.store.messages_by_ids(uncertain_ids)?;
        if candidates.len() < self.config.min_candidates() {
            info!(
                found = candidates.len(),
                "uncertain ids resolved to too few stored messages; skipping discovery"
            );
            return Ok(Vec::new());
        }

        info!(candidates = candidates.len(), "clustering uncertain messages");

        let texts: Vec<String> = candidates
            .iter()
            .map(|c| c.message.feature_text())
            .collect();
        let message_ids: Vec<i64> = candidates.iter().map(|c| c.message.id).collect();
        let current_labels: Vec<Option<String>> = candidates
            .iter()
            .map(|c| c.label.as_ref().map(|l| l.category.clone()))
            .collect();

        let vectorizer =
            TfidfVectorizer::fit(TfidfConfig::unigram(self.config.max_features), &texts);
        let vectors = vectorizer.transform_all(&texts);

        // Primary: density clustering over pairwise cosine distances.
        let distances = pairwise_cosine_distances(&vectors);
        let mut result = dbscan(
            &distances,
            &DbscanParams {
                eps: self.config.eps,
                min_samples: self.config.min_samples,
            },
        );

        // Fallback: partition clustering when density finds no structure.
        if result.is_empty() {
            let k = self.config.fallback_max_clusters.min(vectors.len() / 20);
            if k < 2 {
                info!("density clustering found nothing and too few points for a partition fallback");
                return Ok(Vec::new());
            }
            info!(k, "density clustering found no clusters; falling back to partition clustering");
            result = kmeans(
                &vectors,
                vectorizer.len(),
                &KmeansParams {
                    k,
                    max_iterations: 50,
                },
            );
        }

        let profiles = self.profile_clusters(&result, &vectors, &vectorizer, &message_ids, &current_labels);
        info!(
            clusters = profiles.len(),
            min_size = self.config.min_cluster_size,
            "clusters surviving the size filter"
        );
        Ok(profiles)
    }

    fn profile_clusters(
        &self,
        result: &ClusterResult,
        vectors: &[sift_text::SparseVector],
        vectorizer: &TfidfVectorizer,
        message_ids: &[i64],
        current_labels: &[Option<String>],
    ) -> Vec<ClusterProfile> {
        result
            .clusters
            .iter()
            .filter(|members| members.len() >= self.config.min_cluster_size)
            .map(|members| {
                build_profile(
                    members,
                    vectors,
                    vectorizer.vocabulary(),
                    message_ids,
                    current_labels,
                )
            })
            .collect()
    }

    /// Filter homogeneous clusters and ask the oracle to name the rest.
    /// Persists each accepted proposal with status pending; the automated
    /// loop never applies a proposal to the taxonomy itself.
    fn propose(&self, profiles: &[ClusterProfile]) -> SiftResult<Vec<String>> {
        let novel: Vec<&ClusterProfile> = profiles
            .iter()
            .filter(|profile| {
                let dominant = profile.dominant_fraction();
                if dominant > self.config.homogeneity_threshold {
                    info!(
                        size = profile.size,
                        dominant_fraction = dominant,
                        "cluster is a low-confidence slice of an existing category; skipping"
                    );
                    false
                } else {
                    true
                }
            })
            .collect();

        if novel.is_empty() {
            info!("no novel clusters; all match existing categories");
            return Ok(Vec::new());
        }

        let Some(oracle) = &self.oracle else {
            warn!(
                clusters = novel.len(),
                "no naming oracle configured; novel clusters recorded in logs only"
            );
            return Ok(Vec::new());
        };

        let mut proposals = Vec::new();
        for profile in novel {
            let samples = self.load_samples(&profile.sample_ids)?;
            let request = NamingRequest {
                existing_categories: self
                    .taxonomy
                    .names()
                    .iter()
                    .map(|n| n.to_string())
                    .collect(),
                cluster_size: profile.size,
                top_terms: profile.top_terms.clone(),
                label_distribution: profile.label_distribution.clone(),
                samples,
            };

            match oracle.propose(&request) {
                Ok(NamingVerdict::NewCategory {
                    name,
                    description,
                    reasoning,
                }) => {
                    self.store.append_proposal(&NewProposal {
                        proposed_name: name.clone(),
                        cluster_size: profile.size,
                        sample_message_ids: profile.sample_ids.clone(),
                        description,
                        reasoning,
                    })?;
                    info!(category = %name, size = profile.size, "new category proposed");
                    proposals.push(name);
                }
                Ok(NamingVerdict::NoNewCategory { reasoning }) => {
                    info!(size = profile.size, reasoning = %reasoning, "oracle declined to propose");
                }
                Err(error) => {
                    // Malformed or failed responses cost only this cluster.
                    warn!(size = profile.size, %error, "oracle call failed; dropping this cluster's proposal");
                }
            }
        }
        Ok(proposals)
    }

    fn load_samples(&self, sample_ids: &[i64]) -> SiftResult<Vec<SampleMessage>> {
        Ok(self
            .store
            .messages_by_ids(sample_ids)?
            .into_iter()
            .map(|c| SampleMessage {
                from_addr: c.message.from_addr.clone(),
                subject: c.message.subject.clone(),
                body_preview: c.message.body_preview(SAMPLE_BODY_PREVIEW_CHARS),
            })
            .collect())
    }

    // --- Review interface ---

    pub fn pending_proposals(&self) -> SiftResult<Vec<CategoryProposal>> {
        self.store.pending_proposals()
    }

    /// Accepted proposals are informational at this layer: the taxonomy
    /// update and retrain are an external, manual step.
    pub fn accept_proposal(&self, id: i64) -> SiftResult<()> {
        self.store.update_proposal_status(id, ProposalStatus::Accepted)
    }

    pub fn reject_proposal(&self, id: i64) -> SiftResult<()> {
        self.store.update_proposal_status(id, ProposalStatus::Rejected)
    }
}
