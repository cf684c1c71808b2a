//! v001: messages, labels, model_versions, category_proposals.

use rusqlite::Connection;

use sift_core::errors::SiftResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            provider_id     TEXT NOT NULL,
            account         TEXT NOT NULL,
            thread_id       TEXT,
            internal_date   INTEGER NOT NULL DEFAULT 0,
            from_addr       TEXT NOT NULL DEFAULT '',
            to_addr         TEXT NOT NULL DEFAULT '',
            subject         TEXT NOT NULL DEFAULT '',
            snippet         TEXT NOT NULL DEFAULT '',
            body            TEXT NOT NULL DEFAULT '',
            provider_labels TEXT NOT NULL DEFAULT '[]',
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            UNIQUE(account, provider_id)
        );

        CREATE INDEX IF NOT EXISTS idx_messages_internal_date ON messages(internal_date);
        CREATE INDEX IF NOT EXISTS idx_messages_account ON messages(account);

        CREATE TABLE IF NOT EXISTS labels (
            message_id  INTEGER PRIMARY KEY REFERENCES messages(id),
            category    TEXT NOT NULL,
            confidence  REAL NOT NULL DEFAULT 1.0,
            source      TEXT NOT NULL DEFAULT 'manual',
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_labels_category ON labels(category);
        CREATE INDEX IF NOT EXISTS idx_labels_confidence ON labels(confidence);

        CREATE TABLE IF NOT EXISTS model_versions (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            version         TEXT NOT NULL,
            artifact_path   TEXT,
            num_samples     INTEGER NOT NULL DEFAULT 0,
            num_categories  INTEGER NOT NULL DEFAULT 0,
            accuracy        REAL,
            macro_f1        REAL,
            report          TEXT,
            trigger         TEXT NOT NULL DEFAULT 'manual',
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS category_proposals (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            proposed_name       TEXT NOT NULL,
            cluster_size        INTEGER NOT NULL DEFAULT 0,
            sample_message_ids  TEXT NOT NULL DEFAULT '[]',
            description         TEXT NOT NULL DEFAULT '',
            reasoning           TEXT NOT NULL DEFAULT '',
            status              TEXT NOT NULL DEFAULT 'pending',
            created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_proposals_status ON category_proposals(status);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
