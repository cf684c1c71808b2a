//! Append-only model lineage rows.

use rusqlite::{params, Connection, Row};

use sift_core::errors::SiftResult;
use sift_core::models::{ModelScore, ModelVersion, TrainingTrigger};

use super::parse_datetime;
use crate::to_storage_err;

const VERSION_COLUMNS: &str =
    "version, artifact_path, num_samples, num_categories, accuracy, macro_f1,
     report, trigger, created_at";

/// Record a training run. NULL accuracy/macro_f1 encode insufficient data.
pub fn append(conn: &Connection, version: &ModelVersion) -> SiftResult<()> {
    let report_json = match &version.report {
        Some(report) => {
            Some(serde_json::to_string(report).map_err(|e| to_storage_err(e.to_string()))?)
        }
        None => None,
    };
    conn.execute(
        "INSERT INTO model_versions
         (version, artifact_path, num_samples, num_categories,
          accuracy, macro_f1, report, trigger, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            version.version,
            version.artifact_path,
            version.num_samples as i64,
            version.num_categories as i64,
            version.score.accuracy(),
            version.score.macro_f1(),
            report_json,
            version.trigger.as_str(),
            version.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// The most recent version row, if any.
pub fn latest(conn: &Connection) -> SiftResult<Option<ModelVersion>> {
    let mut history = history(conn, 1)?;
    Ok(history.pop())
}

pub fn count(conn: &Connection) -> SiftResult<usize> {
    conn.query_row("SELECT COUNT(*) FROM model_versions", [], |row| row.get(0))
        .map(|n: i64| n as usize)
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Recent versions, newest first.
pub fn history(conn: &Connection, limit: usize) -> SiftResult<Vec<ModelVersion>> {
    let sql = format!(
        "SELECT {VERSION_COLUMNS} FROM model_versions ORDER BY id DESC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![limit as i64], |row| Ok(parse_version_row(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut versions = Vec::new();
    for row in rows {
        versions.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(versions)
}

fn parse_version_row(row: &Row) -> SiftResult<ModelVersion> {
    let read = |e: rusqlite::Error| to_storage_err(e.to_string());
    let accuracy: Option<f64> = row.get(4).map_err(read)?;
    let macro_f1: Option<f64> = row.get(5).map_err(read)?;
    let score = match (accuracy, macro_f1) {
        (Some(accuracy), Some(macro_f1)) => ModelScore::Evaluated { accuracy, macro_f1 },
        _ => ModelScore::InsufficientData,
    };
    let report_json: Option<String> = row.get(6).map_err(read)?;
    let report = match report_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| to_storage_err(e.to_string()))?,
        None => None,
    };
    let trigger_raw: String = row.get(7).map_err(read)?;
    let created_at: String = row.get(8).map_err(read)?;
    let num_samples: i64 = row.get(2).map_err(read)?;
    let num_categories: i64 = row.get(3).map_err(read)?;
    Ok(ModelVersion {
        version: row.get(0).map_err(read)?,
        artifact_path: row.get(1).map_err(read)?,
        num_samples: num_samples as usize,
        num_categories: num_categories as usize,
        score,
        report,
        trigger: TrainingTrigger::parse(&trigger_raw).unwrap_or(TrainingTrigger::Manual),
        created_at: parse_datetime(&created_at),
    })
}
