//! Queries for the `approval_rules` table.

use rusqlite::{params, params_from_iter, Connection, Row};

use mrguard_core::constants::APPROVAL_RULE_UPDATE_BATCH_SIZE;
use mrguard_core::errors::StorageError;

use super::{placeholders, sqlite_err};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRuleRow {
    pub id: i64,
    pub merge_request_id: i64,
    pub name: String,
    pub scan_result_policy_id: Option<i64>,
    pub policy_name: Option<String>,
    pub approvals_required: u32,
    pub configured_approvals_required: u32,
    pub report_type: String,
    pub criteria_json: String,
    pub fail_open: bool,
    pub applies_to_target_branch: bool,
    pub source_rule_id: Option<i64>,
}

const SELECT_COLUMNS: &str = "id, merge_request_id, name, scan_result_policy_id, policy_name, \
     approvals_required, configured_approvals_required, report_type, criteria_json, fail_open, \
     applies_to_target_branch, source_rule_id";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ApprovalRuleRow> {
    Ok(ApprovalRuleRow {
        id: row.get(0)?,
        merge_request_id: row.get(1)?,
        name: row.get(2)?,
        scan_result_policy_id: row.get(3)?,
        policy_name: row.get(4)?,
        approvals_required: row.get(5)?,
        configured_approvals_required: row.get(6)?,
        report_type: row.get(7)?,
        criteria_json: row.get(8)?,
        fail_open: row.get::<_, i32>(9)? != 0,
        applies_to_target_branch: row.get::<_, i32>(10)? != 0,
        source_rule_id: row.get(11)?,
    })
}

pub fn upsert_approval_rule(conn: &Connection, r: &ApprovalRuleRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO approval_rules (id, merge_request_id, name, scan_result_policy_id, policy_name, approvals_required, configured_approvals_required, report_type, criteria_json, fail_open, applies_to_target_branch, source_rule_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            r.id,
            r.merge_request_id,
            r.name,
            r.scan_result_policy_id,
            r.policy_name,
            r.approvals_required,
            r.configured_approvals_required,
            r.report_type,
            r.criteria_json,
            r.fail_open as i32,
            r.applies_to_target_branch as i32,
            r.source_rule_id
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Rules of a merge request, optionally filtered by report type.
pub fn query_approval_rules(
    conn: &Connection,
    merge_request_id: i64,
    report_type: Option<&str>,
) -> Result<Vec<ApprovalRuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM approval_rules
             WHERE merge_request_id = ?1 AND (?2 IS NULL OR report_type = ?2)
             ORDER BY id"
        ))
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(params![merge_request_id, report_type], map_row)
        .map_err(sqlite_err)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn query_approval_rule(
    conn: &Connection,
    id: i64,
) -> Result<Option<ApprovalRuleRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM approval_rules WHERE id = ?1"
        ))
        .map_err(sqlite_err)?;

    let mut rows = stmt.query_map(params![id], map_row).map_err(sqlite_err)?;
    rows.next().transpose().map_err(sqlite_err)
}

/// Restore `approvals_required` to the configured value.
pub fn reset_approvals_required(conn: &Connection, ids: &[i64]) -> Result<usize, StorageError> {
    update_for_ids(
        conn,
        "UPDATE approval_rules SET approvals_required = configured_approvals_required",
        ids,
    )
}

/// Set `approvals_required` to zero.
pub fn clear_approvals_required(conn: &Connection, ids: &[i64]) -> Result<usize, StorageError> {
    update_for_ids(conn, "UPDATE approval_rules SET approvals_required = 0", ids)
}

fn update_for_ids(conn: &Connection, update: &str, ids: &[i64]) -> Result<usize, StorageError> {
    let mut updated = 0;
    for chunk in ids.chunks(APPROVAL_RULE_UPDATE_BATCH_SIZE) {
        let sql = format!("{update} WHERE id IN ({})", placeholders(1, chunk.len()));
        updated += conn
            .execute(&sql, params_from_iter(chunk.iter()))
            .map_err(sqlite_err)?;
    }
    Ok(updated)
}
