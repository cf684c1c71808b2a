//! # sift-storage
//!
//! SQLite persistence for messages, labels, model lineage, and category
//! proposals. WAL journal mode keeps the serving readers unblocked while the
//! orchestrator writes.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use sift_core::errors::{SiftError, StorageError};

/// Wrap a low-level SQLite failure into the storage error type.
pub(crate) fn to_storage_err(message: impl Into<String>) -> SiftError {
    SiftError::Storage(StorageError::Sqlite {
        message: message.into(),
    })
}
