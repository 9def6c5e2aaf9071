//! Violation persistence backed by `policy_violations`.

use std::sync::Arc;

use mrguard_core::errors::StorageError;
use mrguard_core::traits::ViolationStore;
use mrguard_core::types::{
    MergeRequestId, PolicyId, ProjectId, ViolationChangeSet, ViolationData, ViolationRecord,
};

use super::corrupt;
use crate::queries::violations::{self as q, ViolationRow};
use crate::DatabaseManager;

pub struct SqliteViolationStore {
    db: Arc<DatabaseManager>,
}

impl SqliteViolationStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

impl ViolationStore for SqliteViolationStore {
    fn apply_violation_changes(&self, changes: &ViolationChangeSet) -> Result<(), StorageError> {
        let rows = changes
            .upserts
            .iter()
            .map(|record| {
                let data = if record.violation_data.is_empty() {
                    None
                } else {
                    Some(
                        record
                            .violation_data
                            .to_json()
                            .map_err(|e| corrupt("policy_violations", e))?,
                    )
                };
                Ok(ViolationRow {
                    scan_result_policy_id: record.scan_result_policy_id.get(),
                    merge_request_id: record.merge_request_id.get(),
                    project_id: record.project_id.get(),
                    violation_data: data,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        let delete_ids: Vec<i64> = changes.delete_policy_ids.iter().map(|id| id.get()).collect();
        let merge_request_id = changes.merge_request_id.get();

        let deleted = self.db.with_transaction(|tx| {
            let deleted = q::delete_violations_for_policies(tx, merge_request_id, &delete_ids)?;
            for row in &rows {
                q::upsert_violation(tx, row)?;
            }
            Ok(deleted)
        })?;

        tracing::debug!(
            merge_request_id,
            deleted,
            upserted = rows.len(),
            "applied violation changes"
        );
        Ok(())
    }

    fn violations_for_merge_request(
        &self,
        merge_request_id: MergeRequestId,
    ) -> Result<Vec<ViolationRecord>, StorageError> {
        let rows = self
            .db
            .with_reader(|conn| q::query_violations_by_merge_request(conn, merge_request_id.get()))?;

        rows.into_iter()
            .map(|row| {
                let violation_data = match row.violation_data.as_deref() {
                    Some(raw) => ViolationData::from_json(raw)
                        .map_err(|e| corrupt("policy_violations", e))?,
                    None => ViolationData::default(),
                };
                Ok(ViolationRecord {
                    scan_result_policy_id: PolicyId(row.scan_result_policy_id),
                    merge_request_id: MergeRequestId(row.merge_request_id),
                    project_id: ProjectId(row.project_id),
                    violation_data,
                })
            })
            .collect()
    }
}
