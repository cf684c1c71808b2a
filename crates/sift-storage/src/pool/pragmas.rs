//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL mode so the serving readers are never blocked by the orchestrator's
//! long write transactions; NORMAL sync, 5s busy_timeout, foreign_keys ON.

use rusqlite::Connection;

use sift_core::errors::SiftResult;

use crate::to_storage_err;

/// Pragmas for the write connection.
pub fn apply_write_pragmas(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Pragmas for read connections: same timeouts, queries only.
pub fn apply_read_pragmas(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> SiftResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
