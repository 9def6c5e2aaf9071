//! In-memory collaborators and fixtures shared by engine tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mrguard_core::config::{GuardConfig, LockConfig};
use mrguard_core::errors::{GatewayError, LockError, StorageError};
use mrguard_core::traits::*;
use mrguard_core::types::*;
use mrguard_engine::{EnforcementCollaborators, InMemoryLockService};

// ---- Fixtures ----

pub fn merge_request() -> MergeRequest {
    MergeRequest {
        id: MergeRequestId(1),
        iid: 42,
        project_id: ProjectId(7),
        project_path: "acme/web".into(),
        target_branch: "main".into(),
        target_default_branch: true,
    }
}

pub fn pipeline(id: i64, scans: &[ScanType]) -> PipelineSnapshot {
    PipelineSnapshot {
        id: PipelineId(id),
        status: PipelineStatus::Success,
        can_store_security_reports: true,
        related_pipeline_ids: vec![PipelineId(id)],
        scan_types: scans.iter().copied().collect(),
    }
}

pub fn completion(pipeline: PipelineSnapshot) -> PipelineCompletion {
    PipelineCompletion {
        merge_request: merge_request(),
        pipeline,
    }
}

pub fn scan_criteria(allowed: u32, states: &[VulnerabilityState]) -> ScanFindingRule {
    ScanFindingRule {
        vulnerabilities_allowed: allowed,
        vulnerability_states: states.to_vec(),
        ..Default::default()
    }
}

/// Newly-detected scan finding rule requiring two approvals.
pub fn scan_rule(id: i64, policy: i64, allowed: u32) -> ApprovalRule {
    ApprovalRule {
        id: ApprovalRuleId(id),
        merge_request_id: MergeRequestId(1),
        name: format!("Security rule {id}"),
        scan_result_policy_id: Some(PolicyId(policy)),
        policy_name: Some(format!("Policy {policy}")),
        approvals_required: 2,
        configured_approvals_required: 2,
        criteria: RuleCriteria::ScanFinding(scan_criteria(
            allowed,
            &[VulnerabilityState::NewNeedsTriage],
        )),
        fail_open: false,
        applies_to_target_branch: true,
        source_rule_id: None,
    }
}

pub fn fingerprints(prefix: &str, count: usize) -> BTreeSet<Fingerprint> {
    (0..count)
        .map(|i| Fingerprint::new(format!("{prefix}-{i:03}")))
        .collect()
}

/// Config with a short lock wait so timeout tests stay fast.
pub fn fast_config() -> GuardConfig {
    let mut config = GuardConfig::default();
    config.lock = fast_lock();
    config
}

pub fn fast_lock() -> LockConfig {
    LockConfig {
        ttl_ms: Some(1_000),
        sleep_ms: Some(1),
        retries: Some(3),
    }
}

// ---- Merge requests ----

#[derive(Default)]
pub struct FakeMergeRequests {
    pub rules: Mutex<Vec<ApprovalRule>>,
    pub comparison: Mutex<Option<PipelineSnapshot>>,
    pub fail_rule_lookup: Mutex<bool>,
}

impl FakeMergeRequests {
    pub fn with_rules(rules: Vec<ApprovalRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            ..Default::default()
        }
    }

    pub fn set_comparison(&self, pipeline: Option<PipelineSnapshot>) {
        *self.comparison.lock().unwrap() = pipeline;
    }

    pub fn approvals_required(&self, id: i64) -> u32 {
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == ApprovalRuleId(id))
            .map(|r| r.approvals_required)
            .unwrap()
    }

    fn set_required(&self, ids: &[ApprovalRuleId], configured: bool) {
        for rule in self.rules.lock().unwrap().iter_mut() {
            if ids.contains(&rule.id) {
                rule.approvals_required = if configured {
                    rule.configured_approvals_required
                } else {
                    0
                };
            }
        }
    }
}

impl MergeRequestGateway for FakeMergeRequests {
    fn approval_rules(
        &self,
        _merge_request: &MergeRequest,
        report_type: ReportType,
    ) -> Result<Vec<ApprovalRule>, GatewayError> {
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.report_type() == report_type)
            .cloned()
            .collect())
    }

    fn all_approval_rules(
        &self,
        _merge_request: &MergeRequest,
    ) -> Result<Vec<ApprovalRule>, GatewayError> {
        Ok(self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.scan_result_policy_id.is_some())
            .cloned()
            .collect())
    }

    fn find_approval_rule(
        &self,
        id: ApprovalRuleId,
    ) -> Result<Option<ApprovalRule>, GatewayError> {
        if *self.fail_rule_lookup.lock().unwrap() {
            return Err(GatewayError::Unavailable {
                gateway: "merge_requests",
                message: "rule lookup failed".into(),
            });
        }
        Ok(self.rules.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    fn comparison_pipeline(
        &self,
        _merge_request: &MergeRequest,
    ) -> Result<Option<PipelineSnapshot>, GatewayError> {
        Ok(self.comparison.lock().unwrap().clone())
    }

    fn reset_required_approvals(&self, rule_ids: &[ApprovalRuleId]) -> Result<(), GatewayError> {
        self.set_required(rule_ids, true);
        Ok(())
    }

    fn remove_required_approvals(&self, rule_ids: &[ApprovalRuleId]) -> Result<(), GatewayError> {
        self.set_required(rule_ids, false);
        Ok(())
    }
}

// ---- Findings ----

#[derive(Default)]
pub struct FakeFindings {
    pub by_pipeline: Mutex<BTreeMap<PipelineId, BTreeSet<Fingerprint>>>,
    pub failing: Mutex<BTreeSet<PipelineId>>,
    pub queries: Mutex<Vec<FindingsQuery>>,
}

impl FakeFindings {
    pub fn set(&self, pipeline: i64, fingerprints: BTreeSet<Fingerprint>) {
        self.by_pipeline
            .lock()
            .unwrap()
            .insert(PipelineId(pipeline), fingerprints);
    }

    pub fn fail(&self, pipeline: i64) {
        self.failing.lock().unwrap().insert(PipelineId(pipeline));
    }
}

impl FindingsGateway for FakeFindings {
    fn distinct_fingerprints(
        &self,
        query: &FindingsQuery,
    ) -> Result<BTreeSet<Fingerprint>, GatewayError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing.lock().unwrap().contains(&query.pipeline_id) {
            return Err(GatewayError::Unavailable {
                gateway: "findings",
                message: "findings backend timed out".into(),
            });
        }
        Ok(self
            .by_pipeline
            .lock()
            .unwrap()
            .get(&query.pipeline_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ---- Counting ----

#[derive(Default)]
pub struct FakeCounting {
    pub result: Mutex<VulnerabilityCount>,
    pub queries: Mutex<Vec<CountQuery>>,
}

impl FakeCounting {
    pub fn returning(count: u32, exceeded: bool) -> Self {
        Self {
            result: Mutex::new(VulnerabilityCount {
                count,
                exceeded_allowed_count: exceeded,
            }),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl VulnerabilityCountingGateway for FakeCounting {
    fn count(&self, query: &CountQuery) -> Result<VulnerabilityCount, GatewayError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(*self.result.lock().unwrap())
    }
}

// ---- Comments ----

#[derive(Default)]
pub struct FakeComments {
    pub comments: Mutex<Vec<Comment>>,
    pub reject_with: Mutex<Option<Vec<String>>>,
    pub writes: Mutex<usize>,
}

impl FakeComments {
    pub fn all(&self) -> Vec<Comment> {
        self.comments.lock().unwrap().clone()
    }

    pub fn only_body(&self) -> String {
        let comments = self.all();
        assert_eq!(comments.len(), 1, "expected exactly one comment");
        comments[0].body.clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn insert(&self, author: &str, body: &str) -> Comment {
        let mut comments = self.comments.lock().unwrap();
        let comment = Comment {
            id: CommentId(comments.len() as i64 + 1),
            merge_request_id: MergeRequestId(1),
            project_id: ProjectId(7),
            author: author.to_string(),
            body: body.to_string(),
        };
        comments.push(comment.clone());
        comment
    }

    fn check(&self) -> Result<(), GatewayError> {
        match self.reject_with.lock().unwrap().clone() {
            Some(messages) => Err(GatewayError::Validation { messages }),
            None => Ok(()),
        }
    }
}

impl CommentGateway for FakeComments {
    fn find_by_author_and_prefix(
        &self,
        merge_request_id: MergeRequestId,
        author: &str,
        header: &str,
    ) -> Result<Option<Comment>, GatewayError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| {
                c.merge_request_id == merge_request_id
                    && c.author == author
                    && c.body.starts_with(header)
            })
            .cloned())
    }

    fn create(&self, comment: &NewComment) -> Result<Comment, GatewayError> {
        self.check()?;
        *self.writes.lock().unwrap() += 1;
        Ok(self.insert(&comment.author, &comment.body))
    }

    fn update(&self, id: CommentId, body: &str) -> Result<Comment, GatewayError> {
        self.check()?;
        *self.writes.lock().unwrap() += 1;
        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(GatewayError::NotFound {
                entity: "note",
                id: id.get(),
            })?;
        comment.body = body.to_string();
        Ok(comment.clone())
    }
}

// ---- Violations ----

#[derive(Default)]
pub struct FakeViolationStore {
    pub rows: Mutex<BTreeMap<(MergeRequestId, PolicyId), ViolationRecord>>,
    pub fail: Mutex<bool>,
    pub applies: Mutex<usize>,
}

impl FakeViolationStore {
    pub fn policy_ids(&self) -> Vec<PolicyId> {
        self.rows
            .lock()
            .unwrap()
            .keys()
            .map(|(_, policy)| *policy)
            .collect()
    }

    pub fn row(&self, policy: i64) -> Option<ViolationRecord> {
        self.rows
            .lock()
            .unwrap()
            .get(&(MergeRequestId(1), PolicyId(policy)))
            .cloned()
    }

    pub fn seed(&self, policy: i64, data: ViolationData) {
        self.rows.lock().unwrap().insert(
            (MergeRequestId(1), PolicyId(policy)),
            ViolationRecord {
                scan_result_policy_id: PolicyId(policy),
                merge_request_id: MergeRequestId(1),
                project_id: ProjectId(7),
                violation_data: data,
            },
        );
    }

    pub fn applies(&self) -> usize {
        *self.applies.lock().unwrap()
    }
}

impl ViolationStore for FakeViolationStore {
    fn apply_violation_changes(&self, changes: &ViolationChangeSet) -> Result<(), StorageError> {
        if *self.fail.lock().unwrap() {
            return Err(StorageError::SqliteError {
                message: "disk I/O error".into(),
            });
        }
        *self.applies.lock().unwrap() += 1;
        let mut rows = self.rows.lock().unwrap();
        for policy in &changes.delete_policy_ids {
            rows.remove(&(changes.merge_request_id, *policy));
        }
        for record in &changes.upserts {
            rows.insert(
                (record.merge_request_id, record.scan_result_policy_id),
                record.clone(),
            );
        }
        Ok(())
    }

    fn violations_for_merge_request(
        &self,
        merge_request_id: MergeRequestId,
    ) -> Result<Vec<ViolationRecord>, StorageError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.merge_request_id == merge_request_id)
            .cloned()
            .collect())
    }
}

// ---- Lock ----

/// A lease someone else holds forever.
pub struct HeldLock;

impl LockService for HeldLock {
    fn try_acquire(&self, _key: &str, _ttl: Duration) -> Result<Option<LeaseToken>, LockError> {
        Ok(None)
    }

    fn release(&self, _key: &str, _token: &LeaseToken) -> Result<(), LockError> {
        Ok(())
    }
}

// ---- Wiring ----

/// Fakes behind an `EnforcementCollaborators`, kept typed for assertions.
pub struct Harness {
    pub merge_requests: Arc<FakeMergeRequests>,
    pub findings: Arc<FakeFindings>,
    pub counting: Arc<FakeCounting>,
    pub comments: Arc<FakeComments>,
    pub lock: Arc<InMemoryLockService>,
    pub violations: Arc<FakeViolationStore>,
}

impl Harness {
    pub fn new(rules: Vec<ApprovalRule>) -> Self {
        Self {
            merge_requests: Arc::new(FakeMergeRequests::with_rules(rules)),
            findings: Arc::new(FakeFindings::default()),
            counting: Arc::new(FakeCounting::default()),
            comments: Arc::new(FakeComments::default()),
            lock: Arc::new(InMemoryLockService::new()),
            violations: Arc::new(FakeViolationStore::default()),
        }
    }

    pub fn collaborators(&self) -> EnforcementCollaborators {
        EnforcementCollaborators {
            merge_requests: self.merge_requests.clone(),
            findings: self.findings.clone(),
            counting: self.counting.clone(),
            comments: self.comments.clone(),
            lock: self.lock.clone(),
            violations: self.violations.clone(),
        }
    }
}
