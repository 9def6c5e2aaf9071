//! Domain types shared by the engine and the storage layer.

pub mod approval_rule;
pub mod collections;
pub mod comment;
pub mod identifiers;
pub mod merge_request;
pub mod pipeline;
pub mod policy;
pub mod violation;
pub mod vulnerability;

pub use approval_rule::{ApprovalRule, RuleCriteria};
pub use collections::{FxHashMap, FxHashSet};
pub use comment::{Comment, NewComment};
pub use identifiers::{
    ApprovalRuleId, CommentId, ComplianceFrameworkId, Fingerprint, GroupId, MergeRequestId,
    PipelineId, PolicyId, ProjectId,
};
pub use merge_request::{MergeRequest, ProjectContext};
pub use pipeline::{PipelineCompletion, PipelineSnapshot, PipelineStatus};
pub use policy::{
    AnyMergeRequestRule, CommitsType, FailMode, FallbackBehavior, LicenseFindingRule,
    LicenseState, Policy, PolicyAction, PolicyDocument, PolicyScope, ReportType,
    RequireApprovalAction, Rule, ScanFindingRule, ScopeFilter, ScopeRef, SendBotMessageAction,
};
pub use violation::{
    AnyMergeRequestViolation, EvaluationContext, FingerprintDiff, ScanFindingViolation,
    ViolationChangeSet, ViolationData, ViolationErrorEntry, ViolationErrorKind, ViolationRecord,
    ViolationsByReport,
};
pub use vulnerability::{
    AgeInterval, AgeOperator, ScanType, SeverityLevel, VulnerabilityAge,
    VulnerabilityAttributes, VulnerabilityState,
};
