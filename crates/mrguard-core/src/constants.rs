//! Shared constants for the mrguard policy engine.

/// mrguard version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of fingerprints kept per evidence list. Lists are trimmed
/// to `MAX_VIOLATIONS + 1` so readers can tell that the limit was exceeded.
pub const MAX_VIOLATIONS: usize = 10;

/// Batch size used when deleting violation rows for unviolated policies.
pub const VIOLATION_DELETE_BATCH_SIZE: usize = 1000;

/// Batch size used when updating required approvals of approval rules.
pub const APPROVAL_RULE_UPDATE_BATCH_SIZE: usize = 1000;

/// Header marker that identifies the bot-authored violation comment.
pub const MESSAGE_HEADER: &str = "<!-- policy_violation_comment -->";

/// Default username of the identity that authors the violation comment.
pub const DEFAULT_BOT_USERNAME: &str = "security-policy-bot";

/// Subsystem name embedded in exclusive lock keys.
pub const LOCK_NAMESPACE: &str = "mrguard:policy_violation_comment";

/// Upper bound on rules per policy accepted by the policy loader.
pub const MAX_RULES_PER_POLICY: usize = 5;

/// Upper bound on `approvals_required` accepted by the policy loader.
pub const MAX_APPROVALS_REQUIRED: u32 = 100;

// ---- Lock defaults ----

/// Default lease time-to-live in milliseconds.
pub const DEFAULT_LOCK_TTL_MS: u64 = 10_000;

/// Default sleep between lock acquisition attempts in milliseconds.
pub const DEFAULT_LOCK_SLEEP_MS: u64 = 100;

/// Default number of acquisition retries before giving up.
pub const DEFAULT_LOCK_RETRIES: u32 = 50;
