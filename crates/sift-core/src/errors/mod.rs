//! Error taxonomy: one enum per subsystem, wrapped by [`SiftError`].
//!
//! Stage-local failures (classification, discovery, retraining) are carried as
//! values by the orchestrator and never abort a cycle; only configuration and
//! storage-unavailable conditions are treated as fatal by callers.

pub mod oracle_error;
pub mod storage_error;
pub mod training_error;

pub use oracle_error::OracleError;
pub use storage_error::StorageError;
pub use training_error::TrainingError;

/// Top-level error type for the workspace.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("ingestion error: {message}")]
    Ingest { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the workspace.
pub type SiftResult<T> = Result<T, SiftError>;
