//! StorageEngine — owns the ConnectionPool, implements [`IMessageStore`],
//! runs migrations at startup.

use std::path::Path;

use sift_core::errors::SiftResult;
use sift_core::models::{
    CategoryProposal, EmailMessage, Label, LabeledMessage, MessageWithLabel, ModelVersion,
    NewMessage, NewProposal, ProposalStatus,
};
use sift_core::traits::IMessageStore;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{label_ops, message_ops, proposal_ops, version_ops};

/// Default number of read connections.
const READ_POOL_SIZE: usize = 4;

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
    /// When true, reads go to the read pool (file-backed mode). When false,
    /// reads route through the writer (in-memory mode, where the read pool
    /// connections are isolated databases).
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> SiftResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Migrate through a writer-only pool first so the read-only
        // connections open against a complete schema.
        let writer_only = crate::pool::WriteConnection::open(path)?;
        writer_only.with_conn(migrations::run_migrations)?;
        drop(writer_only);

        let pool = ConnectionPool::open(path, READ_POOL_SIZE)?;
        Ok(Self {
            pool,
            use_read_pool: true,
        })
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> SiftResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        pool.writer.with_conn(migrations::run_migrations)?;
        Ok(Self {
            pool,
            use_read_pool: false,
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> SiftResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn(f)
        }
    }
}

impl IMessageStore for StorageEngine {
    fn insert_message(&self, message: &NewMessage) -> SiftResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| message_ops::insert_if_absent(conn, message))
    }

    fn message_count(&self) -> SiftResult<usize> {
        self.with_reader(message_ops::message_count)
    }

    fn unlabeled_messages(&self, limit: usize) -> SiftResult<Vec<EmailMessage>> {
        self.with_reader(|conn| message_ops::unlabeled(conn, limit))
    }

    fn unlabeled_count(&self) -> SiftResult<usize> {
        self.with_reader(message_ops::unlabeled_count)
    }

    fn messages_by_ids(&self, ids: &[i64]) -> SiftResult<Vec<MessageWithLabel>> {
        self.with_reader(|conn| message_ops::by_ids(conn, ids))
    }

    fn latest_internal_date(&self, account: &str) -> SiftResult<Option<i64>> {
        self.with_reader(|conn| message_ops::latest_internal_date(conn, account))
    }

    fn upsert_label(&self, label: &Label) -> SiftResult<()> {
        self.pool.writer.with_conn(|conn| label_ops::upsert(conn, label))
    }

    fn clear_labels(&self) -> SiftResult<usize> {
        self.pool.writer.with_conn(label_ops::clear)
    }

    fn labeled_messages(&self) -> SiftResult<Vec<LabeledMessage>> {
        self.with_reader(label_ops::labeled_messages)
    }

    fn labeled_count(&self) -> SiftResult<usize> {
        self.with_reader(label_ops::labeled_count)
    }

    fn low_confidence_messages(
        &self,
        threshold: f64,
        limit: usize,
    ) -> SiftResult<Vec<MessageWithLabel>> {
        self.with_reader(|conn| label_ops::low_confidence(conn, threshold, limit))
    }

    fn labels_by_provider_ids(&self, provider_ids: &[String]) -> SiftResult<Vec<(String, Label)>> {
        self.with_reader(|conn| label_ops::labels_by_provider_ids(conn, provider_ids))
    }

    fn label_summary(&self) -> SiftResult<Vec<(String, usize)>> {
        self.with_reader(label_ops::label_summary)
    }

    fn append_model_version(&self, version: &ModelVersion) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| version_ops::append(conn, version))
    }

    fn latest_model_version(&self) -> SiftResult<Option<ModelVersion>> {
        self.with_reader(version_ops::latest)
    }

    fn model_version_count(&self) -> SiftResult<usize> {
        self.with_reader(version_ops::count)
    }

    fn model_version_history(&self, limit: usize) -> SiftResult<Vec<ModelVersion>> {
        self.with_reader(|conn| version_ops::history(conn, limit))
    }

    fn append_proposal(&self, proposal: &NewProposal) -> SiftResult<i64> {
        self.pool
            .writer
            .with_conn(|conn| proposal_ops::append(conn, proposal))
    }

    fn pending_proposals(&self) -> SiftResult<Vec<CategoryProposal>> {
        self.with_reader(proposal_ops::pending)
    }

    fn update_proposal_status(&self, id: i64, status: ProposalStatus) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| proposal_ops::update_status(conn, id, status))
    }
}
