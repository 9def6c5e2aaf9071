//! Pipeline-completion pass: evaluate scan finding rules, adjust required
//! approvals, record violations, refresh the bot comment.

mod types;
mod update_approvals;

pub use types::{EnforcementCollaborators, EnforcementOutcome, RuleEvaluation, SkipReason};

use mrguard_core::config::{EnforcementFlags, GuardConfig};
use mrguard_core::errors::{CommentSyncError, EnforcementError};
use mrguard_core::tracing::metrics;
use mrguard_core::types::{
    ApprovalRuleId, MergeRequest, PipelineCompletion, PolicyId, ReportType,
};

use crate::comment::{CommentRequest, CommentSyncOutcome, ViolationCommentSynchronizer};
use crate::counter::VulnerabilityCounter;
use crate::ledger::ViolationLedger;
use update_approvals::{PassContext, ResolvedRule, RuleEvaluator};

pub struct PolicyEnforcementOrchestrator {
    collaborators: EnforcementCollaborators,
    counter: VulnerabilityCounter,
    synchronizer: ViolationCommentSynchronizer,
    flags: EnforcementFlags,
}

impl PolicyEnforcementOrchestrator {
    pub fn new(collaborators: EnforcementCollaborators, config: &GuardConfig) -> Self {
        let flags = config.enforcement.flags();
        let counter = VulnerabilityCounter::new(
            collaborators.counting.clone(),
            config.comment.effective_max_violations(),
        );
        let synchronizer = ViolationCommentSynchronizer::new(
            collaborators.comments.clone(),
            collaborators.merge_requests.clone(),
            collaborators.violations.clone(),
            collaborators.lock.clone(),
            config.comment.clone(),
            config.lock.clone(),
            flags,
        );
        Self {
            collaborators,
            counter,
            synchronizer,
            flags,
        }
    }

    pub fn flags(&self) -> EnforcementFlags {
        self.flags
    }

    /// Run one pass for a completed merge request pipeline.
    ///
    /// Errors abort the pass before the ledger write; comment failures after
    /// the write are reported in the outcome instead.
    pub fn execute(
        &self,
        event: &PipelineCompletion,
    ) -> Result<EnforcementOutcome, EnforcementError> {
        let merge_request = &event.merge_request;
        let pipeline = &event.pipeline;

        if !pipeline.is_complete(self.flags.include_manual_to_pipeline_completion) {
            return Ok(EnforcementOutcome::Skipped(SkipReason::PipelineIncomplete));
        }
        if !pipeline.can_store_security_reports {
            return Ok(EnforcementOutcome::Skipped(SkipReason::NoSecurityReports));
        }

        let merge_requests = self.collaborators.merge_requests.as_ref();
        let rules: Vec<_> = merge_requests
            .approval_rules(merge_request, ReportType::ScanFinding)?
            .into_iter()
            .filter(|r| r.includes_newly_detected(merge_request.target_default_branch))
            .collect();
        if rules.is_empty() {
            return Ok(EnforcementOutcome::Skipped(SkipReason::NoApplicableRules));
        }

        tracing::info!(
            event = metrics::EVENT_UPDATE_APPROVALS,
            merge_request_id = %merge_request.id,
            merge_request_iid = merge_request.iid,
            project_path = %merge_request.project_path,
            rules = rules.len(),
            "Evaluating MR approval rules from scan result policies"
        );

        let comparison = merge_requests.comparison_pipeline(merge_request)?;
        let pass = PassContext::new(merge_request, pipeline, comparison.as_ref());
        let evaluator = RuleEvaluator {
            findings: self.collaborators.findings.as_ref(),
            counter: &self.counter,
            flags: self.flags,
        };

        let evaluations: Vec<RuleEvaluation> = rules
            .into_iter()
            .map(|rule| match ResolvedRule::resolve(rule.clone(), merge_requests) {
                Ok(resolved) => evaluator.evaluate(&pass, &resolved),
                Err(e) => {
                    tracing::warn!(
                        event = metrics::EVENT_UPDATE_APPROVALS,
                        approval_rule_id = %rule.id,
                        error = %e,
                        "source rule lookup failed"
                    );
                    RuleEvaluator::failed(&pass, &ResolvedRule::unresolved(rule), &e)
                }
            })
            .collect();

        self.update_required_approvals(&evaluations)?;

        let mut ledger = ViolationLedger::new(
            self.collaborators.violations.clone(),
            merge_request.id,
            merge_request.project_id,
        );
        record_evaluations(&mut ledger, &evaluations);
        let summary = ledger.execute()?;

        let comment = self.sync_comment(merge_request);

        Ok(EnforcementOutcome::Evaluated {
            rules: evaluations,
            ledger: summary,
            comment,
        })
    }

    /// Errored rules keep their current required approvals.
    fn update_required_approvals(
        &self,
        evaluations: &[RuleEvaluation],
    ) -> Result<(), EnforcementError> {
        let (violated, unviolated): (Vec<&RuleEvaluation>, Vec<&RuleEvaluation>) = evaluations
            .iter()
            .filter(|e| !e.errored)
            .partition(|e| e.violated);
        let violated: Vec<ApprovalRuleId> = violated.iter().map(|e| e.approval_rule_id).collect();
        let unviolated: Vec<ApprovalRuleId> =
            unviolated.iter().map(|e| e.approval_rule_id).collect();

        let merge_requests = self.collaborators.merge_requests.as_ref();
        if !violated.is_empty() {
            merge_requests.reset_required_approvals(&violated)?;
        }
        if !unviolated.is_empty() {
            merge_requests.remove_required_approvals(&unviolated)?;
        }
        Ok(())
    }

    /// The comment covers every scan finding rule of the target branch, not
    /// only the ones evaluated in this pass.
    fn sync_comment(
        &self,
        merge_request: &MergeRequest,
    ) -> Result<CommentSyncOutcome, CommentSyncError> {
        let rules = self
            .collaborators
            .merge_requests
            .approval_rules(merge_request, ReportType::ScanFinding)?
            .into_iter()
            .filter(|r| r.applies_to_target_branch)
            .collect();
        self.synchronizer.sync(&CommentRequest {
            merge_request: merge_request.clone(),
            report_type: ReportType::ScanFinding,
            rules,
        })
    }
}

/// Errored rules stay out of both sets so their stored row is untouched.
fn record_evaluations(ledger: &mut ViolationLedger, evaluations: &[RuleEvaluation]) {
    let mut violated: Vec<PolicyId> = Vec::new();
    let mut unviolated: Vec<PolicyId> = Vec::new();
    for evaluation in evaluations.iter().filter(|e| !e.errored) {
        let Some(policy_id) = evaluation.policy_id else {
            continue;
        };
        if evaluation.violated {
            violated.push(policy_id);
            ledger.add_violation(policy_id, evaluation.evidence.clone());
        } else {
            unviolated.push(policy_id);
        }
    }
    ledger.add(violated, unviolated);
}
