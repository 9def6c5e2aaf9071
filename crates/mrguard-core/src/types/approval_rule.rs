//! Merge request approval rules created from policy rules.

use serde::{Deserialize, Serialize};

use super::identifiers::{ApprovalRuleId, MergeRequestId, PolicyId};
use super::policy::{AnyMergeRequestRule, LicenseFindingRule, ReportType, ScanFindingRule};
use super::vulnerability::VulnerabilityState;

/// Report-type specific criteria copied from the policy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report_type", rename_all = "snake_case")]
pub enum RuleCriteria {
    ScanFinding(ScanFindingRule),
    LicenseScanning(LicenseFindingRule),
    AnyMergeRequest(AnyMergeRequestRule),
}

impl RuleCriteria {
    pub fn report_type(&self) -> ReportType {
        match self {
            Self::ScanFinding(_) => ReportType::ScanFinding,
            Self::LicenseScanning(_) => ReportType::LicenseScanning,
            Self::AnyMergeRequest(_) => ReportType::AnyMergeRequest,
        }
    }
}

/// Projection of a policy rule onto one merge request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalRule {
    pub id: ApprovalRuleId,
    pub merge_request_id: MergeRequestId,
    pub name: String,
    /// Correlates the rule with its policy and violation row.
    pub scan_result_policy_id: Option<PolicyId>,
    pub policy_name: Option<String>,
    /// Currently required approvals; mutated by every evaluation pass.
    pub approvals_required: u32,
    /// Value restored when the rule is violated again.
    pub configured_approvals_required: u32,
    pub criteria: RuleCriteria,
    /// Policy fallback is `fail: open`.
    pub fail_open: bool,
    /// Rule targets the merge request's target branch.
    pub applies_to_target_branch: bool,
    /// Set when this rule was cloned/overridden from another rule whose
    /// identity should be used for evaluation.
    pub source_rule_id: Option<ApprovalRuleId>,
}

impl ApprovalRule {
    pub fn report_type(&self) -> ReportType {
        self.criteria.report_type()
    }

    pub fn scan_finding(&self) -> Option<&ScanFindingRule> {
        match &self.criteria {
            RuleCriteria::ScanFinding(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn requires_approval(&self) -> bool {
        self.approvals_required > 0
    }

    /// Whether this rule reacts to newly detected vulnerabilities. Only such
    /// rules are evaluated on pipeline completion.
    pub fn includes_newly_detected(&self, target_default_branch: bool) -> bool {
        self.scan_finding()
            .is_some_and(|r| r.includes_newly_detected(target_default_branch))
    }

    pub fn vulnerability_states_for_branch(
        &self,
        target_default_branch: bool,
    ) -> Vec<VulnerabilityState> {
        self.scan_finding()
            .map(|r| r.states_for_branch(target_default_branch))
            .unwrap_or_default()
    }
}
