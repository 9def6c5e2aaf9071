//! Per-rule evaluation of scan finding approval rules.

use std::collections::BTreeSet;

use mrguard_core::config::EnforcementFlags;
use mrguard_core::errors::GatewayError;
use mrguard_core::traits::{FindingsGateway, FindingsQuery, MergeRequestGateway};
use mrguard_core::tracing::metrics;
use mrguard_core::types::{
    ApprovalRule, EvaluationContext, Fingerprint, MergeRequest, PipelineId, PipelineSnapshot,
    ScanFindingRule, ScanType, ViolationData, ViolationErrorEntry,
};

use super::RuleEvaluation;
use crate::counter::VulnerabilityCounter;

/// A merge request rule together with the rule it was derived from. The
/// source rule supplies criteria, policy and fallback; approvals are
/// adjusted on the merge request rule.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedRule {
    pub merge_request_rule: ApprovalRule,
    pub source: ApprovalRule,
}

impl ResolvedRule {
    /// Follow `source_rule_id` once. A source that is missing or not a scan
    /// finding rule falls back to the rule itself.
    pub fn resolve(
        rule: ApprovalRule,
        merge_requests: &dyn MergeRequestGateway,
    ) -> Result<Self, GatewayError> {
        let source = match rule.source_rule_id {
            Some(id) => merge_requests
                .find_approval_rule(id)?
                .filter(|source| source.scan_finding().is_some()),
            None => None,
        };
        Ok(Self {
            source: source.unwrap_or_else(|| rule.clone()),
            merge_request_rule: rule,
        })
    }

    pub fn unresolved(rule: ApprovalRule) -> Self {
        Self {
            source: rule.clone(),
            merge_request_rule: rule,
        }
    }

    fn criteria(&self) -> Option<&ScanFindingRule> {
        self.source
            .scan_finding()
            .or_else(|| self.merge_request_rule.scan_finding())
    }
}

/// Values computed once per pass and shared by every rule.
pub(crate) struct PassContext<'a> {
    pub merge_request: &'a MergeRequest,
    pub pipeline: &'a PipelineSnapshot,
    pub comparison: Option<&'a PipelineSnapshot>,
    pub evaluation_context: EvaluationContext,
}

impl<'a> PassContext<'a> {
    pub fn new(
        merge_request: &'a MergeRequest,
        pipeline: &'a PipelineSnapshot,
        comparison: Option<&'a PipelineSnapshot>,
    ) -> Self {
        let evaluation_context = EvaluationContext {
            pipeline_ids: related_ids(pipeline),
            target_pipeline_ids: comparison.map(related_ids).unwrap_or_default(),
        };
        Self {
            merge_request,
            pipeline,
            comparison,
            evaluation_context,
        }
    }

    fn target_scan_types(&self) -> BTreeSet<ScanType> {
        self.comparison
            .map(|p| p.scan_types.clone())
            .unwrap_or_default()
    }

    /// Scans the target pipeline ran that the merge request pipeline did
    /// not, restricted to `scanners` when non-empty.
    pub fn missing_scans(&self, scanners: &[ScanType]) -> Vec<ScanType> {
        self.target_scan_types()
            .difference(&self.pipeline.scan_types)
            .filter(|scan| scanners.is_empty() || scanners.contains(scan))
            .copied()
            .collect()
    }

    fn evidence(&self, data: ViolationData) -> ViolationData {
        data.with_context(self.evaluation_context.clone())
    }
}

fn related_ids(pipeline: &PipelineSnapshot) -> Vec<PipelineId> {
    if pipeline.related_pipeline_ids.is_empty() {
        vec![pipeline.id]
    } else {
        pipeline.related_pipeline_ids.clone()
    }
}

pub(crate) struct RuleEvaluator<'a> {
    pub findings: &'a dyn FindingsGateway,
    pub counter: &'a VulnerabilityCounter,
    pub flags: EnforcementFlags,
}

impl RuleEvaluator<'_> {
    /// Decide one rule. Gateway failures become `UNKNOWN` evidence on an
    /// errored rule so the rest of the pass can continue.
    pub fn evaluate(&self, pass: &PassContext<'_>, rule: &ResolvedRule) -> RuleEvaluation {
        match self.try_evaluate(pass, rule) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                tracing::warn!(
                    event = metrics::EVENT_UPDATE_APPROVALS,
                    merge_request_id = %pass.merge_request.id,
                    approval_rule_id = %rule.merge_request_rule.id,
                    reason = metrics::REASON_EVALUATION_ERROR,
                    error = %e,
                    "Updating MR approval rule"
                );
                Self::failed(pass, rule, &e)
            }
        }
    }

    pub fn failed(pass: &PassContext<'_>, rule: &ResolvedRule, error: &GatewayError) -> RuleEvaluation {
        RuleEvaluation {
            approval_rule_id: rule.merge_request_rule.id,
            policy_id: rule.source.scan_result_policy_id,
            violated: false,
            errored: true,
            evidence: pass.evidence(ViolationData::error(ViolationErrorEntry::unknown(
                error.to_string(),
            ))),
        }
    }

    fn try_evaluate(
        &self,
        pass: &PassContext<'_>,
        rule: &ResolvedRule,
    ) -> Result<RuleEvaluation, GatewayError> {
        let merge_request = pass.merge_request;
        let Some(criteria) = rule.criteria() else {
            return Ok(RuleEvaluation {
                approval_rule_id: rule.merge_request_rule.id,
                policy_id: rule.source.scan_result_policy_id,
                violated: false,
                errored: false,
                evidence: ViolationData::default(),
            });
        };

        let missing = pass.missing_scans(&criteria.scanners);
        if !missing.is_empty() {
            let fail_open = self.flags.fallback_behavior_enabled && rule.source.fail_open;
            tracing::info!(
                event = metrics::EVENT_UPDATE_APPROVALS,
                merge_request_id = %merge_request.id,
                merge_request_iid = merge_request.iid,
                project_path = %merge_request.project_path,
                approval_rule_id = %rule.merge_request_rule.id,
                approval_rule_name = %rule.merge_request_rule.name,
                reason = metrics::REASON_SCAN_REMOVED,
                missing_scans = ?missing,
                fail_open,
                "Updating MR approval rule"
            );
            return Ok(RuleEvaluation {
                approval_rule_id: rule.merge_request_rule.id,
                policy_id: rule.source.scan_result_policy_id,
                violated: !fail_open,
                errored: false,
                evidence: pass.evidence(ViolationData::error(ViolationErrorEntry::scan_removed(
                    missing,
                ))),
            });
        }

        let target_default_branch = merge_request.target_default_branch;
        let current = self.findings.distinct_fingerprints(&findings_query(
            merge_request,
            pass.pipeline,
            criteria,
            target_default_branch,
            true,
        ))?;
        let comparison: BTreeSet<Fingerprint> = match pass.comparison {
            Some(target) => self.findings.distinct_fingerprints(&findings_query(
                merge_request,
                target,
                criteria,
                target_default_branch,
                false,
            ))?,
            None => BTreeSet::new(),
        };

        let outcome = self.counter.evaluate(
            merge_request.project_id,
            criteria,
            target_default_branch,
            &current,
            &comparison,
        )?;

        let reason = if outcome.violated {
            metrics::REASON_VIOLATED
        } else {
            metrics::REASON_NOT_VIOLATED
        };
        tracing::info!(
            event = metrics::EVENT_UPDATE_APPROVALS,
            merge_request_id = %merge_request.id,
            merge_request_iid = merge_request.iid,
            project_path = %merge_request.project_path,
            approval_rule_id = %rule.merge_request_rule.id,
            approval_rule_name = %rule.merge_request_rule.name,
            reason,
            "Updating MR approval rule"
        );

        let evidence = match outcome.evidence {
            Some(diff) => pass.evidence(ViolationData::scan_finding(diff)),
            None => ViolationData::default(),
        };
        Ok(RuleEvaluation {
            approval_rule_id: rule.merge_request_rule.id,
            policy_id: rule.source.scan_result_policy_id,
            violated: outcome.violated,
            errored: false,
            evidence,
        })
    }
}

fn findings_query(
    merge_request: &MergeRequest,
    pipeline: &PipelineSnapshot,
    criteria: &ScanFindingRule,
    target_default_branch: bool,
    check_dismissed: bool,
) -> FindingsQuery {
    FindingsQuery {
        project_id: merge_request.project_id,
        pipeline_id: pipeline.id,
        related_pipeline_ids: pipeline.related_pipeline_ids.clone(),
        vulnerability_states: criteria.states_for_branch(target_default_branch),
        severity_levels: criteria.severity_levels.clone(),
        scanners: criteria.scanners.clone(),
        fix_available: criteria.vulnerability_attributes.fix_available,
        false_positive: criteria.vulnerability_attributes.false_positive,
        check_dismissed,
    }
}
