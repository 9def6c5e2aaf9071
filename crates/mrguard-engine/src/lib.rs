//! mrguard-engine: evaluates merge requests against vulnerability approval
//! policies on pipeline completion, records violations, adjusts required
//! approvals, and keeps the bot comment in sync.

pub mod comment;
pub mod counter;
pub mod ledger;
pub mod lock;
pub mod orchestrator;
pub mod scope;

pub use comment::{CommentRequest, CommentSyncOutcome, ViolationCommentSynchronizer};
pub use counter::{CountOutcome, VulnerabilityCounter};
pub use ledger::{LedgerSummary, ViolationLedger};
pub use lock::{in_lock, InMemoryLockService};
pub use orchestrator::{
    EnforcementCollaborators, EnforcementOutcome, PolicyEnforcementOrchestrator, RuleEvaluation,
    SkipReason,
};
pub use scope::PolicyScopeMatcher;
