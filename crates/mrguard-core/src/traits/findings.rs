//! Vulnerability finding and counting gateways.

use std::collections::BTreeSet;

use crate::errors::GatewayError;
use crate::types::{
    Fingerprint, PipelineId, ProjectId, ScanType, SeverityLevel, VulnerabilityAge,
    VulnerabilityState,
};

/// Filter parameters for a findings lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindingsQuery {
    pub project_id: ProjectId,
    pub pipeline_id: PipelineId,
    /// Empty means "only `pipeline_id`".
    pub related_pipeline_ids: Vec<PipelineId>,
    pub vulnerability_states: Vec<VulnerabilityState>,
    pub severity_levels: Vec<SeverityLevel>,
    pub scanners: Vec<ScanType>,
    pub fix_available: Option<bool>,
    pub false_positive: Option<bool>,
    /// Exclude findings whose vulnerability was dismissed, unless the
    /// `new_dismissed` state is requested.
    pub check_dismissed: bool,
}

/// Returns de-duplicated finding fingerprints for a pipeline.
pub trait FindingsGateway: Send + Sync {
    fn distinct_fingerprints(
        &self,
        query: &FindingsQuery,
    ) -> Result<BTreeSet<Fingerprint>, GatewayError>;
}

/// Parameters of a vulnerability count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountQuery {
    pub project_id: ProjectId,
    pub fingerprints: Vec<Fingerprint>,
    /// States to count; never contains newly-detected states.
    pub states: Vec<VulnerabilityState>,
    pub allowed_count: u32,
    pub vulnerability_age: Option<VulnerabilityAge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VulnerabilityCount {
    pub count: u32,
    /// The source stopped counting because `allowed_count` was exceeded.
    pub exceeded_allowed_count: bool,
}

/// Counts recorded vulnerabilities matching a rule's filters.
pub trait VulnerabilityCountingGateway: Send + Sync {
    fn count(&self, query: &CountQuery) -> Result<VulnerabilityCount, GatewayError>;
}
