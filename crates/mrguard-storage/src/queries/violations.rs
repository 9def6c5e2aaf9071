//! Queries for the `policy_violations` table.

use rusqlite::{params, params_from_iter, types::Value, Connection};

use mrguard_core::constants::VIOLATION_DELETE_BATCH_SIZE;
use mrguard_core::errors::StorageError;

use super::{placeholders, sqlite_err};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationRow {
    pub scan_result_policy_id: i64,
    pub merge_request_id: i64,
    pub project_id: i64,
    pub violation_data: Option<String>,
}

/// Insert a violation or replace the payload of the existing row for the
/// same (policy, merge request) pair.
pub fn upsert_violation(conn: &Connection, v: &ViolationRow) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO policy_violations (scan_result_policy_id, merge_request_id, project_id, violation_data)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(scan_result_policy_id, merge_request_id) DO UPDATE SET
             project_id = excluded.project_id,
             violation_data = excluded.violation_data,
             updated_at = CAST(strftime('%s', 'now') AS INTEGER)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            v.scan_result_policy_id,
            v.merge_request_id,
            v.project_id,
            v.violation_data
        ])
    })
    .map_err(sqlite_err)?;
    Ok(())
}

/// Delete the merge request's violations for `policy_ids`, in batches.
/// Returns the number of deleted rows.
pub fn delete_violations_for_policies(
    conn: &Connection,
    merge_request_id: i64,
    policy_ids: &[i64],
) -> Result<usize, StorageError> {
    let mut deleted = 0;
    for chunk in policy_ids.chunks(VIOLATION_DELETE_BATCH_SIZE) {
        let sql = format!(
            "DELETE FROM policy_violations
             WHERE merge_request_id = ?1 AND scan_result_policy_id IN ({})",
            placeholders(2, chunk.len())
        );
        let values = std::iter::once(Value::Integer(merge_request_id))
            .chain(chunk.iter().map(|id| Value::Integer(*id)));
        deleted += conn
            .execute(&sql, params_from_iter(values))
            .map_err(sqlite_err)?;
    }
    Ok(deleted)
}

pub fn query_violations_by_merge_request(
    conn: &Connection,
    merge_request_id: i64,
) -> Result<Vec<ViolationRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT scan_result_policy_id, merge_request_id, project_id, violation_data
             FROM policy_violations WHERE merge_request_id = ?1
             ORDER BY scan_result_policy_id",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(params![merge_request_id], |row| {
            Ok(ViolationRow {
                scan_result_policy_id: row.get(0)?,
                merge_request_id: row.get(1)?,
                project_id: row.get(2)?,
                violation_data: row.get(3)?,
            })
        })
        .map_err(sqlite_err)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn count_violations(conn: &Connection, merge_request_id: i64) -> Result<u64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM policy_violations WHERE merge_request_id = ?1",
        params![merge_request_id],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}
