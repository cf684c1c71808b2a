/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("proposal {id} cannot move from '{from}' to '{to}'")]
    InvalidTransition { id: i64, from: String, to: String },

    #[error("no proposal with id {id}")]
    ProposalNotFound { id: i64 },
}
