//! Label upsert and label-joined selects.

use rusqlite::{params, Connection, Row};

use sift_core::constants::LOOKUP_BATCH_CAP;
use sift_core::errors::SiftResult;
use sift_core::models::{Confidence, Label, LabelSource, LabeledMessage, MessageWithLabel};

use super::message_ops::{parse_message_row, MESSAGE_COLUMNS};
use super::parse_datetime;
use crate::to_storage_err;

/// Insert or replace the label for a message. Re-running the same
/// classification leaves exactly one row with unchanged content.
pub fn upsert(conn: &Connection, label: &Label) -> SiftResult<()> {
    conn.execute(
        "INSERT INTO labels (message_id, category, confidence, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(message_id) DO UPDATE SET
             category = excluded.category,
             confidence = excluded.confidence,
             source = excluded.source,
             created_at = excluded.created_at",
        params![
            label.message_id,
            label.category,
            label.confidence.value(),
            label.source.as_str(),
            label.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Delete all labels (re-labeling under a new taxonomy). Returns the count.
pub fn clear(conn: &Connection) -> SiftResult<usize> {
    conn.execute("DELETE FROM labels", [])
        .map_err(|e| to_storage_err(e.to_string()))
}

/// All labeled messages, for training.
pub fn labeled_messages(conn: &Connection) -> SiftResult<Vec<LabeledMessage>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS},
                l.category, l.confidence, l.source, l.created_at
         FROM messages m
         INNER JOIN labels l ON m.id = l.message_id
         ORDER BY m.internal_date DESC"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((parse_message_row(row), parse_label_columns(row, 12)))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let (message, label) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let message = message?;
        if let Some(label) = label? {
            results.push(LabeledMessage {
                message,
                category: label.category,
                confidence: label.confidence,
                source: label.source,
            });
        }
    }
    Ok(results)
}

pub fn labeled_count(conn: &Connection) -> SiftResult<usize> {
    conn.query_row("SELECT COUNT(*) FROM labels", [], |row| row.get(0))
        .map(|n: i64| n as usize)
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Messages with label confidence below `threshold`, lowest first.
pub fn low_confidence(
    conn: &Connection,
    threshold: f64,
    limit: usize,
) -> SiftResult<Vec<MessageWithLabel>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS},
                l.category, l.confidence, l.source, l.created_at
         FROM messages m
         INNER JOIN labels l ON m.id = l.message_id
         WHERE l.confidence < ?1
         ORDER BY l.confidence ASC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![threshold, limit as i64], |row| {
            Ok((parse_message_row(row), parse_label_columns(row, 12)))
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

/// Batch label lookup by provider id for the serving layer. Input past the
/// serving cap is truncated.
pub fn labels_by_provider_ids(
    conn: &Connection,
    provider_ids: &[String],
) -> SiftResult<Vec<(String, Label)>> {
    let capped = &provider_ids[..provider_ids.len().min(LOOKUP_BATCH_CAP)];
    if capped.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders: Vec<String> = (1..=capped.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT m.provider_id, m.id, l.category, l.confidence, l.source, l.created_at
         FROM messages m
         INNER JOIN labels l ON m.id = l.message_id
         WHERE m.provider_id IN ({})",
        placeholders.join(", ")
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let bound: Vec<&dyn rusqlite::types::ToSql> = capped
        .iter()
        .map(|id| id as &dyn rusqlite::types::ToSql)
        .collect();
    let rows = stmt
        .query_map(bound.as_slice(), |row| {
            let provider_id: String = row.get(0)?;
            let message_id: i64 = row.get(1)?;
            Ok((provider_id, message_id, parse_label_columns(row, 2)))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let (provider_id, message_id, label) = row.map_err(|e| to_storage_err(e.to_string()))?;
        if let Some(mut label) = label? {
            label.message_id = message_id;
            results.push((provider_id, label));
        }
    }
    Ok(results)
}

/// (category, count) pairs, largest first.
pub fn label_summary(conn: &Connection) -> SiftResult<Vec<(String, usize)>> {
    let mut stmt = conn
        .prepare(
            "SELECT category, COUNT(*) as cnt
             FROM labels
             GROUP BY category
             ORDER BY cnt DESC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            let category: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((category, count as usize))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(results)
}

/// Parse optional label columns (category, confidence, source, created_at)
/// starting at `offset`. Returns None when the LEFT JOIN produced no label.
/// The message_id on the returned label is filled in by the caller when it
/// has the joined message at hand.
pub(crate) fn parse_label_columns(row: &Row, offset: usize) -> SiftResult<Option<Label>> {
    let read = |e: rusqlite::Error| to_storage_err(e.to_string());
    let category: Option<String> = row.get(offset).map_err(read)?;
    let Some(category) = category else {
        return Ok(None);
    };
    let confidence: f64 = row.get(offset + 1).map_err(read)?;
    let source_raw: String = row.get(offset + 2).map_err(read)?;
    let created_at: String = row.get(offset + 3).map_err(read)?;
    Ok(Some(Label {
        message_id: 0,
        category,
        confidence: Confidence::new(confidence),
        source: LabelSource::parse(&source_raw).unwrap_or(LabelSource::Manual),
        created_at: parse_datetime(&created_at),
    }))
}
