//! Orchestrator inputs and outcomes.

use std::sync::Arc;

use serde::Serialize;

use mrguard_core::errors::CommentSyncError;
use mrguard_core::traits::{
    CommentGateway, FindingsGateway, LockService, MergeRequestGateway, ViolationStore,
    VulnerabilityCountingGateway,
};
use mrguard_core::types::{ApprovalRuleId, PolicyId, ViolationData};

use crate::comment::CommentSyncOutcome;
use crate::ledger::LedgerSummary;

/// Collaborators injected into the orchestrator.
#[derive(Clone)]
pub struct EnforcementCollaborators {
    pub merge_requests: Arc<dyn MergeRequestGateway>,
    pub findings: Arc<dyn FindingsGateway>,
    pub counting: Arc<dyn VulnerabilityCountingGateway>,
    pub comments: Arc<dyn CommentGateway>,
    pub lock: Arc<dyn LockService>,
    pub violations: Arc<dyn ViolationStore>,
}

/// Why a pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    PipelineIncomplete,
    NoSecurityReports,
    NoApplicableRules,
}

/// Decision for one approval rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEvaluation {
    /// The merge request's rule whose required approvals were adjusted.
    pub approval_rule_id: ApprovalRuleId,
    /// Policy of the (source) rule; `None` for rules not backed by a policy.
    pub policy_id: Option<PolicyId>,
    pub violated: bool,
    /// Evaluation failed; the rule's approvals and violation row are left
    /// as the previous pass recorded them.
    pub errored: bool,
    /// Evidence gathered for the rule. Only violated rules persist it.
    pub evidence: ViolationData,
}

#[derive(Debug)]
pub enum EnforcementOutcome {
    Skipped(SkipReason),
    Evaluated {
        rules: Vec<RuleEvaluation>,
        ledger: LedgerSummary,
        /// Comment failures do not undo the committed ledger write.
        comment: Result<CommentSyncOutcome, CommentSyncError>,
    },
}

impl EnforcementOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn rules(&self) -> &[RuleEvaluation] {
        match self {
            Self::Skipped(_) => &[],
            Self::Evaluated { rules, .. } => rules,
        }
    }
}
