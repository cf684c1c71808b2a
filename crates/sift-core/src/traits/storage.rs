use crate::errors::SiftResult;
use crate::models::{
    CategoryProposal, EmailMessage, Label, LabeledMessage, MessageWithLabel, ModelVersion,
    NewMessage, NewProposal, ProposalStatus,
};

/// The full persistence contract the evolution engine depends on:
/// messages + labels + model lineage + category proposals.
pub trait IMessageStore: Send + Sync {
    // --- Messages ---
    /// Insert if absent, keyed by (account, provider_id).
    /// Returns true when a row was inserted.
    fn insert_message(&self, message: &NewMessage) -> SiftResult<bool>;
    fn message_count(&self) -> SiftResult<usize>;
    /// Unlabeled messages, most recent first, bounded by `limit`.
    fn unlabeled_messages(&self, limit: usize) -> SiftResult<Vec<EmailMessage>>;
    fn unlabeled_count(&self) -> SiftResult<usize>;
    fn messages_by_ids(&self, ids: &[i64]) -> SiftResult<Vec<MessageWithLabel>>;
    /// Newest internal_date stored for an account, for incremental sync.
    fn latest_internal_date(&self, account: &str) -> SiftResult<Option<i64>>;

    // --- Labels ---
    /// Insert or replace the label for a message (idempotent upsert).
    fn upsert_label(&self, label: &Label) -> SiftResult<()>;
    /// Delete all labels; returns the number removed.
    fn clear_labels(&self) -> SiftResult<usize>;
    fn labeled_messages(&self) -> SiftResult<Vec<LabeledMessage>>;
    fn labeled_count(&self) -> SiftResult<usize>;
    /// Messages whose label confidence is below `threshold`, lowest first.
    fn low_confidence_messages(
        &self,
        threshold: f64,
        limit: usize,
    ) -> SiftResult<Vec<MessageWithLabel>>;
    /// Batch label lookup by provider id for the serving layer.
    /// Input past the serving cap is truncated.
    fn labels_by_provider_ids(&self, provider_ids: &[String]) -> SiftResult<Vec<(String, Label)>>;
    /// (category, count) pairs, largest first.
    fn label_summary(&self) -> SiftResult<Vec<(String, usize)>>;

    // --- Model lineage ---
    fn append_model_version(&self, version: &ModelVersion) -> SiftResult<()>;
    fn latest_model_version(&self) -> SiftResult<Option<ModelVersion>>;
    fn model_version_count(&self) -> SiftResult<usize>;
    fn model_version_history(&self, limit: usize) -> SiftResult<Vec<ModelVersion>>;

    // --- Category proposals ---
    /// Append a proposal with status pending; returns its id.
    fn append_proposal(&self, proposal: &NewProposal) -> SiftResult<i64>;
    fn pending_proposals(&self) -> SiftResult<Vec<CategoryProposal>>;
    /// Transition a proposal's status. Only pending proposals may move.
    fn update_proposal_status(&self, id: i64, status: ProposalStatus) -> SiftResult<()>;
}
