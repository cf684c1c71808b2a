//! Schema migrations tracked via `PRAGMA user_version`.

pub mod v001_initial;

use rusqlite::Connection;

use sift_core::errors::{SiftError, SiftResult, StorageError};
use tracing::info;

use crate::to_storage_err;

/// Migrations in order. Entry N migrates the schema to user_version N + 1.
const MIGRATIONS: &[(u32, fn(&Connection) -> SiftResult<()>)] = &[(1, v001_initial::migrate)];

/// Run all outstanding migrations.
pub fn run_migrations(conn: &Connection) -> SiftResult<()> {
    let current: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| {
            SiftError::Storage(StorageError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| to_storage_err(e.to_string()))?;
        info!(version, "applied schema migration");
    }
    Ok(())
}
