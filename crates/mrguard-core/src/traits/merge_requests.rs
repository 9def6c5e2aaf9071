//! Merge request access: approval rules and comparison pipeline.

use crate::errors::GatewayError;
use crate::types::{ApprovalRule, ApprovalRuleId, MergeRequest, PipelineSnapshot, ReportType};

pub trait MergeRequestGateway: Send + Sync {
    /// Approval rules of `report_type` attached to the merge request.
    fn approval_rules(
        &self,
        merge_request: &MergeRequest,
        report_type: ReportType,
    ) -> Result<Vec<ApprovalRule>, GatewayError>;

    /// Every policy-backed approval rule attached to the merge request.
    fn all_approval_rules(
        &self,
        merge_request: &MergeRequest,
    ) -> Result<Vec<ApprovalRule>, GatewayError>;

    /// Look up a rule by id (used for source-rule indirection).
    fn find_approval_rule(&self, id: ApprovalRuleId)
        -> Result<Option<ApprovalRule>, GatewayError>;

    /// Latest target-branch pipeline with security reports to compare with.
    fn comparison_pipeline(
        &self,
        merge_request: &MergeRequest,
    ) -> Result<Option<PipelineSnapshot>, GatewayError>;

    /// Restore `approvals_required` to the configured value for each rule.
    fn reset_required_approvals(&self, rule_ids: &[ApprovalRuleId]) -> Result<(), GatewayError>;

    /// Set `approvals_required` to zero for each rule.
    fn remove_required_approvals(&self, rule_ids: &[ApprovalRuleId]) -> Result<(), GatewayError>;
}
