//! ViolationLedger: collects violated/unviolated policy ids and evidence
//! during one evaluation pass, then writes them in one transaction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use mrguard_core::errors::StorageError;
use mrguard_core::traits::ViolationStore;
use mrguard_core::tracing::metrics;
use mrguard_core::types::{
    MergeRequestId, PolicyId, ProjectId, ScanType, ViolationChangeSet, ViolationData,
    ViolationErrorEntry, ViolationErrorKind, ViolationRecord,
};

/// What one `execute` wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub upserted: Vec<PolicyId>,
    pub deleted: Vec<PolicyId>,
}

/// Not `Clone`: a ledger belongs to a single pass.
pub struct ViolationLedger {
    store: Arc<dyn ViolationStore>,
    merge_request_id: MergeRequestId,
    project_id: ProjectId,
    violated: BTreeSet<PolicyId>,
    unviolated: BTreeSet<PolicyId>,
    evidence: BTreeMap<PolicyId, ViolationData>,
}

impl ViolationLedger {
    pub fn new(
        store: Arc<dyn ViolationStore>,
        merge_request_id: MergeRequestId,
        project_id: ProjectId,
    ) -> Self {
        Self {
            store,
            merge_request_id,
            project_id,
            violated: BTreeSet::new(),
            unviolated: BTreeSet::new(),
            evidence: BTreeMap::new(),
        }
    }

    /// Union the given ids into the pending sets.
    pub fn add(
        &mut self,
        violated: impl IntoIterator<Item = PolicyId>,
        unviolated: impl IntoIterator<Item = PolicyId>,
    ) {
        self.violated.extend(violated);
        self.unviolated.extend(unviolated);
    }

    /// Attach evidence to a policy. Repeated calls merge.
    pub fn add_violation(&mut self, policy_id: PolicyId, data: ViolationData) {
        self.evidence.entry(policy_id).or_default().merge(data);
    }

    /// Record a structured evaluation error for a policy.
    pub fn add_error(
        &mut self,
        policy_id: PolicyId,
        kind: ViolationErrorKind,
        missing_scans: Vec<ScanType>,
    ) {
        self.add_violation(
            policy_id,
            ViolationData::error(ViolationErrorEntry {
                error: kind,
                missing_scans,
                message: None,
            }),
        );
    }

    pub fn violated(&self) -> &BTreeSet<PolicyId> {
        &self.violated
    }

    pub fn unviolated(&self) -> &BTreeSet<PolicyId> {
        &self.unviolated
    }

    pub fn is_empty(&self) -> bool {
        self.violated.is_empty() && self.unviolated.is_empty()
    }

    /// Write the pending state: delete rows of unviolated policies, upsert
    /// one row per violated policy. A policy present in both sets counts as
    /// violated. Pending state is cleared whether or not the write succeeds.
    pub fn execute(&mut self) -> Result<LedgerSummary, StorageError> {
        let violated = std::mem::take(&mut self.violated);
        let unviolated = std::mem::take(&mut self.unviolated);
        let mut evidence = std::mem::take(&mut self.evidence);

        let deleted: Vec<PolicyId> = unviolated.difference(&violated).copied().collect();
        let upserts: Vec<ViolationRecord> = violated
            .iter()
            .map(|policy_id| ViolationRecord {
                scan_result_policy_id: *policy_id,
                merge_request_id: self.merge_request_id,
                project_id: self.project_id,
                violation_data: evidence.remove(policy_id).unwrap_or_default(),
            })
            .collect();

        if deleted.is_empty() && upserts.is_empty() {
            return Ok(LedgerSummary::default());
        }

        let changes = ViolationChangeSet {
            merge_request_id: self.merge_request_id,
            project_id: self.project_id,
            delete_policy_ids: deleted.clone(),
            upserts,
        };
        self.store.apply_violation_changes(&changes)?;

        tracing::info!(
            event = metrics::EVENT_LEDGER_EXECUTE,
            merge_request_id = %self.merge_request_id,
            upserted = violated.len(),
            deleted = deleted.len(),
            "violations written"
        );

        Ok(LedgerSummary {
            upserted: violated.into_iter().collect(),
            deleted,
        })
    }
}
