//! Violation evidence payload and persisted violation rows.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifiers::{Fingerprint, MergeRequestId, PipelineId, PolicyId, ProjectId};
use super::vulnerability::ScanType;

/// Newly-detected vs previously-existing fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintDiff {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub newly_detected: Vec<Fingerprint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub previously_existing: Vec<Fingerprint>,
}

impl FingerprintDiff {
    pub fn is_empty(&self) -> bool {
        self.newly_detected.is_empty() && self.previously_existing.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanFindingViolation {
    pub uuids: FingerprintDiff,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnyMergeRequestViolation {
    pub commits: Vec<String>,
}

/// Evidence grouped by report type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolationsByReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_finding: Option<ScanFindingViolation>,
    /// License name → dependencies using it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_scanning: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_merge_request: Option<AnyMergeRequestViolation>,
}

impl ViolationsByReport {
    pub fn is_empty(&self) -> bool {
        self.scan_finding.is_none()
            && self.license_scanning.is_none()
            && self.any_merge_request.is_none()
    }
}

/// Pipelines compared by the evaluation that produced the evidence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationContext {
    pub pipeline_ids: Vec<PipelineId>,
    pub target_pipeline_ids: Vec<PipelineId>,
}

/// Structured evaluation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationErrorKind {
    ScanRemoved,
    ArtifactsMissing,
    #[serde(other)]
    Unknown,
}

impl ViolationErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScanRemoved => "SCAN_REMOVED",
            Self::ArtifactsMissing => "ARTIFACTS_MISSING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ViolationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationErrorEntry {
    pub error: ViolationErrorKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_scans: Vec<ScanType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ViolationErrorEntry {
    pub fn scan_removed(missing_scans: Vec<ScanType>) -> Self {
        Self {
            error: ViolationErrorKind::ScanRemoved,
            missing_scans,
            message: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            error: ViolationErrorKind::Unknown,
            missing_scans: Vec::new(),
            message: Some(message.into()),
        }
    }
}

/// The `violation_data` payload of a violation row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolationData {
    #[serde(skip_serializing_if = "ViolationsByReport::is_empty")]
    pub violations: ViolationsByReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<EvaluationContext>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ViolationErrorEntry>,
}

impl ViolationData {
    pub fn scan_finding(diff: FingerprintDiff) -> Self {
        Self {
            violations: ViolationsByReport {
                scan_finding: Some(ScanFindingViolation { uuids: diff }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn error(entry: ViolationErrorEntry) -> Self {
        Self {
            errors: vec![entry],
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: EvaluationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty() && self.context.is_none() && self.errors.is_empty()
    }

    pub fn has_error(&self, kind: ViolationErrorKind) -> bool {
        self.errors.iter().any(|e| e.error == kind)
    }

    /// Merge `other` into `self`; `other` wins for report sections and
    /// context, errors accumulate without duplicates.
    pub fn merge(&mut self, other: ViolationData) {
        if other.violations.scan_finding.is_some() {
            self.violations.scan_finding = other.violations.scan_finding;
        }
        if other.violations.license_scanning.is_some() {
            self.violations.license_scanning = other.violations.license_scanning;
        }
        if other.violations.any_merge_request.is_some() {
            self.violations.any_merge_request = other.violations.any_merge_request;
        }
        if other.context.is_some() {
            self.context = other.context;
        }
        for entry in other.errors {
            if !self.errors.contains(&entry) {
                self.errors.push(entry);
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// One persisted violation row: a (merge request, policy) pair that is
/// currently violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationRecord {
    pub scan_result_policy_id: PolicyId,
    pub merge_request_id: MergeRequestId,
    pub project_id: ProjectId,
    pub violation_data: ViolationData,
}

/// Changes produced by one evaluation pass, applied atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationChangeSet {
    pub merge_request_id: MergeRequestId,
    pub project_id: ProjectId,
    pub delete_policy_ids: Vec<PolicyId>,
    pub upserts: Vec<ViolationRecord>,
}

impl ViolationChangeSet {
    pub fn is_empty(&self) -> bool {
        self.delete_policy_ids.is_empty() && self.upserts.is_empty()
    }
}
