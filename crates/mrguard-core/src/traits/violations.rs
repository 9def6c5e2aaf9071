//! Violation persistence.

use crate::errors::StorageError;
use crate::types::{MergeRequestId, ViolationChangeSet, ViolationRecord};

pub trait ViolationStore: Send + Sync {
    /// Apply deletes and upserts in one transaction. Upserts conflict on
    /// `(scan_result_policy_id, merge_request_id)` and replace the payload.
    fn apply_violation_changes(&self, changes: &ViolationChangeSet) -> Result<(), StorageError>;

    fn violations_for_merge_request(
        &self,
        merge_request_id: MergeRequestId,
    ) -> Result<Vec<ViolationRecord>, StorageError>;
}
