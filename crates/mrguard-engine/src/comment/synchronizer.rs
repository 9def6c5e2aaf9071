//! Keeps the single bot-authored violation comment of a merge request in
//! sync with the stored violations.

use std::collections::BTreeSet;
use std::sync::Arc;

use mrguard_core::config::{CommentConfig, EnforcementFlags, LockConfig};
use mrguard_core::constants::MESSAGE_HEADER;
use mrguard_core::errors::CommentSyncError;
use mrguard_core::traits::{CommentGateway, LockService, MergeRequestGateway, ViolationStore};
use mrguard_core::tracing::metrics;
use mrguard_core::types::{ApprovalRule, Comment, MergeRequest, NewComment, PolicyId, ReportType};

use super::{DetailedCommentBuilder, LegacyCommentBuilder, RESOLVED_NOTE};
use crate::lock::{in_lock, lock_key};

/// Trigger for one synchronization: the report type that was just
/// evaluated and the approval rules of that type.
#[derive(Debug, Clone)]
pub struct CommentRequest {
    pub merge_request: MergeRequest,
    pub report_type: ReportType,
    pub rules: Vec<ApprovalRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentSyncOutcome {
    Created(Comment),
    Updated(Comment),
    /// Nothing to report and nothing written.
    Skipped,
}

pub struct ViolationCommentSynchronizer {
    comments: Arc<dyn CommentGateway>,
    merge_requests: Arc<dyn MergeRequestGateway>,
    violations: Arc<dyn ViolationStore>,
    lock: Arc<dyn LockService>,
    comment_config: CommentConfig,
    lock_config: LockConfig,
    flags: EnforcementFlags,
}

impl ViolationCommentSynchronizer {
    pub fn new(
        comments: Arc<dyn CommentGateway>,
        merge_requests: Arc<dyn MergeRequestGateway>,
        violations: Arc<dyn ViolationStore>,
        lock: Arc<dyn LockService>,
        comment_config: CommentConfig,
        lock_config: LockConfig,
        flags: EnforcementFlags,
    ) -> Self {
        Self {
            comments,
            merge_requests,
            violations,
            lock,
            comment_config,
            lock_config,
            flags,
        }
    }

    /// Create, update, or leave alone the bot comment. Serialized per merge
    /// request through the lock service.
    pub fn sync(&self, request: &CommentRequest) -> Result<CommentSyncOutcome, CommentSyncError> {
        let key = lock_key(request.merge_request.id);
        let result = in_lock(self.lock.as_ref(), &key, &self.lock_config, || {
            self.sync_locked(request)
        });

        match &result {
            Ok(outcome) => tracing::info!(
                event = metrics::EVENT_COMMENT_SYNC,
                merge_request_id = %request.merge_request.id,
                report_type = %request.report_type,
                outcome = outcome.label(),
                "policy violation comment synchronized"
            ),
            Err(e) => tracing::warn!(
                event = metrics::EVENT_COMMENT_SYNC,
                merge_request_id = %request.merge_request.id,
                report_type = %request.report_type,
                error = %e,
                "policy violation comment not synchronized"
            ),
        }
        result
    }

    fn sync_locked(&self, request: &CommentRequest) -> Result<CommentSyncOutcome, CommentSyncError> {
        let merge_request = &request.merge_request;
        let author = self.comment_config.effective_bot_username();
        let existing =
            self.comments
                .find_by_author_and_prefix(merge_request.id, author, MESSAGE_HEADER)?;

        let body = if self.flags.save_policy_violation_data {
            self.detailed_body(merge_request)?
        } else {
            self.legacy_body(request, existing.as_ref())?
        };

        let body = match (body, &existing) {
            (Some(body), _) => body,
            (None, Some(_)) if self.flags.announce_resolution => {
                format!("{MESSAGE_HEADER}\n{RESOLVED_NOTE}\n")
            }
            (None, _) => return Ok(CommentSyncOutcome::Skipped),
        };

        match existing {
            Some(comment) if comment.body == body => Ok(CommentSyncOutcome::Updated(comment)),
            Some(comment) => Ok(CommentSyncOutcome::Updated(
                self.comments.update(comment.id, &body)?,
            )),
            None => Ok(CommentSyncOutcome::Created(self.comments.create(&NewComment {
                merge_request_id: merge_request.id,
                project_id: merge_request.project_id,
                author: author.to_string(),
                body,
            })?)),
        }
    }

    fn detailed_body(&self, merge_request: &MergeRequest) -> Result<Option<String>, CommentSyncError> {
        let violations = self.violations.violations_for_merge_request(merge_request.id)?;
        if violations.is_empty() {
            return Ok(None);
        }
        let rules = self.merge_requests.all_approval_rules(merge_request)?;
        Ok(DetailedCommentBuilder::new(
            &violations,
            &rules,
            self.comment_config.effective_max_violations(),
        )
        .body())
    }

    fn legacy_body(
        &self,
        request: &CommentRequest,
        existing: Option<&Comment>,
    ) -> Result<Option<String>, CommentSyncError> {
        let stored: BTreeSet<PolicyId> = self
            .violations
            .violations_for_merge_request(request.merge_request.id)?
            .into_iter()
            .map(|v| v.scan_result_policy_id)
            .collect();
        let violated: Vec<&ApprovalRule> = request
            .rules
            .iter()
            .filter(|r| r.scan_result_policy_id.is_some_and(|id| stored.contains(&id)))
            .collect();

        let mut builder = LegacyCommentBuilder::from_existing(existing.map(|c| c.body.as_str()));
        if violated.is_empty() {
            builder.remove_report_type(request.report_type);
        } else {
            let requires_approval = violated.iter().any(|r| r.requires_approval());
            builder.add_report_type(request.report_type, requires_approval);
        }
        Ok(builder.body())
    }
}

impl CommentSyncOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Skipped => "skipped",
        }
    }
}
