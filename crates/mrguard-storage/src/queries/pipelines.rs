//! Queries for the `comparison_pipelines` table.

use rusqlite::{params, Connection};

use mrguard_core::errors::StorageError;

use super::sqlite_err;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPipelineRow {
    pub merge_request_id: i64,
    pub pipeline_id: i64,
    pub status: String,
    pub can_store_security_reports: bool,
    /// JSON array of pipeline ids.
    pub related_pipeline_ids: String,
    /// JSON array of scan type names.
    pub scan_types: String,
}

pub fn upsert_comparison_pipeline(
    conn: &Connection,
    p: &ComparisonPipelineRow,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO comparison_pipelines (merge_request_id, pipeline_id, status, can_store_security_reports, related_pipeline_ids, scan_types)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            p.merge_request_id,
            p.pipeline_id,
            p.status,
            p.can_store_security_reports as i32,
            p.related_pipeline_ids,
            p.scan_types
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn query_comparison_pipeline(
    conn: &Connection,
    merge_request_id: i64,
) -> Result<Option<ComparisonPipelineRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT merge_request_id, pipeline_id, status, can_store_security_reports, related_pipeline_ids, scan_types
             FROM comparison_pipelines WHERE merge_request_id = ?1",
        )
        .map_err(sqlite_err)?;

    let mut rows = stmt
        .query_map(params![merge_request_id], |row| {
            Ok(ComparisonPipelineRow {
                merge_request_id: row.get(0)?,
                pipeline_id: row.get(1)?,
                status: row.get(2)?,
                can_store_security_reports: row.get::<_, i32>(3)? != 0,
                related_pipeline_ids: row.get(4)?,
                scan_types: row.get(5)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.next().transpose().map_err(sqlite_err)
}
