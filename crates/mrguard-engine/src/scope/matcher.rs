//! Decides whether a policy governs a project.

use mrguard_core::types::{Policy, PolicyScope, ProjectContext};

/// Compliance framework, project, and group scope checks. Each dimension
/// applies when it is not configured; all three must hold.
pub struct PolicyScopeMatcher;

impl PolicyScopeMatcher {
    pub fn applicable(policy: &Policy, project: &ProjectContext) -> bool {
        Self::scope_applies(&policy.scope, project)
    }

    /// Enabled policies whose scope includes the project.
    pub fn applicable_policies<'a>(
        policies: &'a [Policy],
        project: &ProjectContext,
    ) -> Vec<&'a Policy> {
        policies
            .iter()
            .filter(|p| p.enabled && Self::applicable(p, project))
            .collect()
    }

    fn scope_applies(scope: &PolicyScope, project: &ProjectContext) -> bool {
        Self::compliance_frameworks_apply(scope, project)
            && Self::projects_apply(scope, project)
            && Self::groups_apply(scope, project)
    }

    fn compliance_frameworks_apply(scope: &PolicyScope, project: &ProjectContext) -> bool {
        if scope.compliance_frameworks.is_empty() {
            return true;
        }
        scope
            .compliance_frameworks
            .iter()
            .any(|f| project.compliance_framework_ids.contains(&f.id))
    }

    fn projects_apply(scope: &PolicyScope, project: &ProjectContext) -> bool {
        let projects = &scope.projects;
        if projects.excludes(project.project_id) {
            return false;
        }
        projects.including.is_empty() || projects.includes(project.project_id)
    }

    fn groups_apply(scope: &PolicyScope, project: &ProjectContext) -> bool {
        let groups = &scope.groups;
        if project
            .ancestor_group_ids
            .iter()
            .any(|g| groups.excludes(*g))
        {
            return false;
        }
        groups.including.is_empty()
            || project.ancestor_group_ids.iter().any(|g| groups.includes(*g))
    }
}
