//! Category proposal persistence with monotonic status transitions.

use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::{SiftError, SiftResult, StorageError};
use sift_core::models::{CategoryProposal, NewProposal, ProposalStatus};

use super::parse_datetime;
use crate::to_storage_err;

const PROPOSAL_COLUMNS: &str =
    "id, proposed_name, cluster_size, sample_message_ids, description,
     reasoning, status, created_at";

/// Append a proposal with status pending; returns its id.
pub fn append(conn: &Connection, proposal: &NewProposal) -> SiftResult<i64> {
    let sample_ids = serde_json::to_string(&proposal.sample_message_ids)
        .map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        "INSERT INTO category_proposals
         (proposed_name, cluster_size, sample_message_ids, description, reasoning, status)
         VALUES (?1, ?2, ?3, ?4, ?5, 'pending')",
        params![
            proposal.proposed_name,
            proposal.cluster_size as i64,
            sample_ids,
            proposal.description,
            proposal.reasoning,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Pending proposals, newest first.
pub fn pending(conn: &Connection) -> SiftResult<Vec<CategoryProposal>> {
    let sql = format!(
        "SELECT {PROPOSAL_COLUMNS}
         FROM category_proposals
         WHERE status = 'pending'
         ORDER BY id DESC"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok(parse_proposal_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut proposals = Vec::new();
    for row in rows {
        proposals.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(proposals)
}

pub fn get(conn: &Connection, id: i64) -> SiftResult<Option<CategoryProposal>> {
    let sql = format!("SELECT {PROPOSAL_COLUMNS} FROM category_proposals WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], |row| Ok(parse_proposal_row(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.transpose()
}

/// Transition a proposal's status. Only pending proposals may move, and only
/// to a terminal state.
pub fn update_status(conn: &Connection, id: i64, status: ProposalStatus) -> SiftResult<()> {
    let current = get(conn, id)?
        .ok_or(SiftError::Storage(StorageError::ProposalNotFound { id }))?;
    if !current.status.can_transition_to(status) {
        return Err(SiftError::Storage(StorageError::InvalidTransition {
            id,
            from: current.status.as_str().to_string(),
            to: status.as_str().to_string(),
        }));
    }
    conn.execute(
        "UPDATE category_proposals SET status = ?1 WHERE id = ?2 AND status = 'pending'",
        params![status.as_str(), id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn parse_proposal_row(row: &Row) -> SiftResult<CategoryProposal> {
    let read = |e: rusqlite::Error| to_storage_err(e.to_string());
    let sample_ids_json: String = row.get(3).map_err(read)?;
    let sample_message_ids =
        serde_json::from_str(&sample_ids_json).map_err(|e| to_storage_err(e.to_string()))?;
    let status_raw: String = row.get(6).map_err(read)?;
    let created_at: String = row.get(7).map_err(read)?;
    let cluster_size: i64 = row.get(2).map_err(read)?;
    Ok(CategoryProposal {
        id: row.get(0).map_err(read)?,
        proposed_name: row.get(1).map_err(read)?,
        cluster_size: cluster_size as usize,
        sample_message_ids,
        description: row.get(4).map_err(read)?,
        reasoning: row.get(5).map_err(read)?,
        status: ProposalStatus::parse(&status_raw).unwrap_or(ProposalStatus::Pending),
        created_at: parse_datetime(&created_at),
    })
}
