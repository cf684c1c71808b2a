//! Insert and select operations for messages.

use rusqlite::{params, Connection, Row};

use sift_core::errors::SiftResult;
use sift_core::models::{EmailMessage, MessageWithLabel, NewMessage};

use super::{label_ops, parse_datetime};
use crate::to_storage_err;

/// The base SELECT columns for message queries (12 columns, indices 0-11).
pub(crate) const MESSAGE_COLUMNS: &str =
    "m.id, m.provider_id, m.account, m.thread_id, m.internal_date,
     m.from_addr, m.to_addr, m.subject, m.snippet, m.body,
     m.provider_labels, m.created_at";

/// Insert a message if no row exists for (account, provider_id).
/// Returns true when a row was actually inserted.
pub fn insert_if_absent(conn: &Connection, message: &NewMessage) -> SiftResult<bool> {
    let labels_json = serde_json::to_string(&message.provider_labels)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO messages
             (provider_id, account, thread_id, internal_date, from_addr,
              to_addr, subject, snippet, body, provider_labels)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                message.provider_id,
                message.account,
                message.thread_id,
                message.internal_date,
                message.from_addr,
                message.to_addr,
                message.subject,
                message.snippet,
                message.body,
                labels_json,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed > 0)
}

pub fn message_count(conn: &Connection) -> SiftResult<usize> {
    conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
        .map(|n: i64| n as usize)
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Messages with no label yet, most recent first.
pub fn unlabeled(conn: &Connection, limit: usize) -> SiftResult<Vec<EmailMessage>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS}
         FROM messages m
         LEFT JOIN labels l ON m.id = l.message_id
         WHERE l.message_id IS NULL
         ORDER BY m.internal_date DESC
         LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![limit as i64], |row| Ok(parse_message_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(messages)
}

pub fn unlabeled_count(conn: &Connection) -> SiftResult<usize> {
    conn.query_row(
        "SELECT COUNT(*)
         FROM messages m
         LEFT JOIN labels l ON m.id = l.message_id
         WHERE l.message_id IS NULL",
        [],
        |row| row.get(0),
    )
    .map(|n: i64| n as usize)
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Messages (with their current label, if any) for the given ids.
pub fn by_ids(conn: &Connection, ids: &[i64]) -> SiftResult<Vec<MessageWithLabel>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS},
                l.category, l.confidence, l.source, l.created_at
         FROM messages m
         LEFT JOIN labels l ON m.id = l.message_id
         WHERE m.id IN ({})",
        placeholders.join(", ")
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let bound: Vec<&dyn rusqlite::types::ToSql> =
        ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();
    let rows = stmt
        .query_map(bound.as_slice(), |row| {
            Ok((parse_message_row(row), label_ops::parse_label_columns(row, 12)))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let (message, label) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let message = message?;
        let label = label?.map(|mut l| {
            l.message_id = message.id;
            l
        });
        results.push(MessageWithLabel { message, label });
    }
    Ok(results)
}

/// Newest internal_date stored for an account.
pub fn latest_internal_date(conn: &Connection, account: &str) -> SiftResult<Option<i64>> {
    conn.query_row(
        "SELECT MAX(internal_date) FROM messages WHERE account = ?1",
        params![account],
        |row| row.get::<_, Option<i64>>(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Parse one message row laid out per [`MESSAGE_COLUMNS`].
pub(crate) fn parse_message_row(row: &Row) -> SiftResult<EmailMessage> {
    let read = |e: rusqlite::Error| to_storage_err(e.to_string());
    let labels_json: String = row.get(10).map_err(read)?;
    let provider_labels =
        serde_json::from_str(&labels_json).map_err(|e| to_storage_err(e.to_string()))?;
    let created_at: String = row.get(11).map_err(read)?;
    Ok(EmailMessage {
        id: row.get(0).map_err(read)?,
        provider_id: row.get(1).map_err(read)?,
        account: row.get(2).map_err(read)?,
        thread_id: row.get(3).map_err(read)?,
        internal_date: row.get(4).map_err(read)?,
        from_addr: row.get(5).map_err(read)?,
        to_addr: row.get(6).map_err(read)?,
        subject: row.get(7).map_err(read)?,
        snippet: row.get(8).map_err(read)?,
        body: row.get(9).map_err(read)?,
        provider_labels,
        created_at: parse_datetime(&created_at),
    })
}
