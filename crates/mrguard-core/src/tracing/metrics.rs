//! Structured log values shared across mrguard crates.
//!
//! Log events carry these as field values so log queries can key on them.

/// `event` of the orchestrator's approval update logs.
pub const EVENT_UPDATE_APPROVALS: &str = "update_approvals";

/// `event` of ledger writes.
pub const EVENT_LEDGER_EXECUTE: &str = "violation_ledger_execute";

/// `event` of comment synchronization.
pub const EVENT_COMMENT_SYNC: &str = "policy_violation_comment";

// ---- `reason` values for approval updates ----

pub const REASON_SCAN_REMOVED: &str = "Scan removed";

pub const REASON_VIOLATED: &str = "Policy violated";

pub const REASON_NOT_VIOLATED: &str = "No violations";

pub const REASON_EVALUATION_ERROR: &str = "Evaluation error";
