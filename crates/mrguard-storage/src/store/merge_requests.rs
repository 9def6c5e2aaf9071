//! Merge request gateway backed by `approval_rules` and
//! `comparison_pipelines`.

use std::collections::BTreeSet;
use std::sync::Arc;

use mrguard_core::errors::{GatewayError, StorageError};
use mrguard_core::traits::MergeRequestGateway;
use mrguard_core::types::{
    ApprovalRule, ApprovalRuleId, MergeRequest, MergeRequestId, PipelineId, PipelineSnapshot,
    PipelineStatus, PolicyId, ReportType, RuleCriteria, ScanType,
};

use super::corrupt;
use crate::queries::approval_rules::{self as rules_q, ApprovalRuleRow};
use crate::queries::pipelines::{self as pipelines_q, ComparisonPipelineRow};
use crate::DatabaseManager;

pub struct SqliteMergeRequestGateway {
    db: Arc<DatabaseManager>,
}

impl SqliteMergeRequestGateway {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Insert or replace an approval rule (rule synchronization writes
    /// these when policies change).
    pub fn save_approval_rule(&self, rule: &ApprovalRule) -> Result<(), StorageError> {
        let row = to_row(rule)?;
        self.db
            .with_writer(|conn| rules_q::upsert_approval_rule(conn, &row))
    }

    /// Record the target-branch pipeline a merge request is compared with.
    pub fn save_comparison_pipeline(
        &self,
        merge_request_id: MergeRequestId,
        pipeline: &PipelineSnapshot,
    ) -> Result<(), StorageError> {
        let row = ComparisonPipelineRow {
            merge_request_id: merge_request_id.get(),
            pipeline_id: pipeline.id.get(),
            status: encode_enum(&pipeline.status)?,
            can_store_security_reports: pipeline.can_store_security_reports,
            related_pipeline_ids: serde_json::to_string(&pipeline.related_pipeline_ids)
                .map_err(|e| corrupt("comparison_pipelines", e))?,
            scan_types: serde_json::to_string(&pipeline.scan_types)
                .map_err(|e| corrupt("comparison_pipelines", e))?,
        };
        self.db
            .with_writer(|conn| pipelines_q::upsert_comparison_pipeline(conn, &row))
    }

    fn load_rules(
        &self,
        merge_request_id: MergeRequestId,
        report_type: Option<ReportType>,
    ) -> Result<Vec<ApprovalRule>, GatewayError> {
        let rows = self.db.with_reader(|conn| {
            rules_q::query_approval_rules(
                conn,
                merge_request_id.get(),
                report_type.map(ReportType::as_str),
            )
        })?;
        rows.into_iter()
            .map(|row| from_row(row).map_err(GatewayError::from))
            .collect()
    }
}

impl MergeRequestGateway for SqliteMergeRequestGateway {
    fn approval_rules(
        &self,
        merge_request: &MergeRequest,
        report_type: ReportType,
    ) -> Result<Vec<ApprovalRule>, GatewayError> {
        self.load_rules(merge_request.id, Some(report_type))
    }

    fn all_approval_rules(
        &self,
        merge_request: &MergeRequest,
    ) -> Result<Vec<ApprovalRule>, GatewayError> {
        let rules = self.load_rules(merge_request.id, None)?;
        Ok(rules
            .into_iter()
            .filter(|r| r.scan_result_policy_id.is_some())
            .collect())
    }

    fn find_approval_rule(
        &self,
        id: ApprovalRuleId,
    ) -> Result<Option<ApprovalRule>, GatewayError> {
        let row = self
            .db
            .with_reader(|conn| rules_q::query_approval_rule(conn, id.get()))?;
        Ok(row.map(from_row).transpose()?)
    }

    fn comparison_pipeline(
        &self,
        merge_request: &MergeRequest,
    ) -> Result<Option<PipelineSnapshot>, GatewayError> {
        let row = self.db.with_reader(|conn| {
            pipelines_q::query_comparison_pipeline(conn, merge_request.id.get())
        })?;
        let Some(row) = row else {
            return Ok(None);
        };

        let related: Vec<PipelineId> = serde_json::from_str(&row.related_pipeline_ids)
            .map_err(|e| corrupt("comparison_pipelines", e))?;
        let scan_types: BTreeSet<ScanType> = serde_json::from_str(&row.scan_types)
            .map_err(|e| corrupt("comparison_pipelines", e))?;
        let status: PipelineStatus = decode_enum("comparison_pipelines", &row.status)?;

        Ok(Some(PipelineSnapshot {
            id: PipelineId(row.pipeline_id),
            status,
            can_store_security_reports: row.can_store_security_reports,
            related_pipeline_ids: related,
            scan_types,
        }))
    }

    fn reset_required_approvals(&self, rule_ids: &[ApprovalRuleId]) -> Result<(), GatewayError> {
        let ids: Vec<i64> = rule_ids.iter().map(|id| id.get()).collect();
        self.db
            .with_transaction(|tx| rules_q::reset_approvals_required(tx, &ids))?;
        Ok(())
    }

    fn remove_required_approvals(&self, rule_ids: &[ApprovalRuleId]) -> Result<(), GatewayError> {
        let ids: Vec<i64> = rule_ids.iter().map(|id| id.get()).collect();
        self.db
            .with_transaction(|tx| rules_q::clear_approvals_required(tx, &ids))?;
        Ok(())
    }
}

fn to_row(rule: &ApprovalRule) -> Result<ApprovalRuleRow, StorageError> {
    Ok(ApprovalRuleRow {
        id: rule.id.get(),
        merge_request_id: rule.merge_request_id.get(),
        name: rule.name.clone(),
        scan_result_policy_id: rule.scan_result_policy_id.map(PolicyId::get),
        policy_name: rule.policy_name.clone(),
        approvals_required: rule.approvals_required,
        configured_approvals_required: rule.configured_approvals_required,
        report_type: rule.report_type().as_str().to_string(),
        criteria_json: serde_json::to_string(&rule.criteria)
            .map_err(|e| corrupt("approval_rules", e))?,
        fail_open: rule.fail_open,
        applies_to_target_branch: rule.applies_to_target_branch,
        source_rule_id: rule.source_rule_id.map(ApprovalRuleId::get),
    })
}

fn from_row(row: ApprovalRuleRow) -> Result<ApprovalRule, StorageError> {
    let criteria: RuleCriteria =
        serde_json::from_str(&row.criteria_json).map_err(|e| corrupt("approval_rules", e))?;
    if criteria.report_type().as_str() != row.report_type {
        return Err(corrupt(
            "approval_rules",
            format!(
                "rule {} has report_type {} but {} criteria",
                row.id,
                row.report_type,
                criteria.report_type()
            ),
        ));
    }

    Ok(ApprovalRule {
        id: ApprovalRuleId(row.id),
        merge_request_id: MergeRequestId(row.merge_request_id),
        name: row.name,
        scan_result_policy_id: row.scan_result_policy_id.map(PolicyId),
        policy_name: row.policy_name,
        approvals_required: row.approvals_required,
        configured_approvals_required: row.configured_approvals_required,
        criteria,
        fail_open: row.fail_open,
        applies_to_target_branch: row.applies_to_target_branch,
        source_rule_id: row.source_rule_id.map(ApprovalRuleId),
    })
}

/// Unit enum variant → its serde name.
fn encode_enum<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        Ok(other) => Err(corrupt("comparison_pipelines", format!("not a unit variant: {other}"))),
        Err(e) => Err(corrupt("comparison_pipelines", e)),
    }
}

fn decode_enum<T: serde::de::DeserializeOwned>(table: &str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|e| corrupt(table, e))
}
