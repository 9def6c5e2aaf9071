//! Merge request and project context.

use serde::{Deserialize, Serialize};

use super::identifiers::{ComplianceFrameworkId, GroupId, MergeRequestId, ProjectId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: MergeRequestId,
    /// Per-project sequential number.
    pub iid: i64,
    pub project_id: ProjectId,
    pub project_path: String,
    pub target_branch: String,
    /// The target branch is the project's default branch.
    pub target_default_branch: bool,
}

/// Project attributes needed to decide policy applicability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    pub project_id: ProjectId,
    pub compliance_framework_ids: Vec<ComplianceFrameworkId>,
    /// Ancestor group ids, nearest first.
    pub ancestor_group_ids: Vec<GroupId>,
}
