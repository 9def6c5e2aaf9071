//! GuardErrorCode trait: stable, machine-readable error codes.

/// Every error enum implements this to expose a structured code string
/// that callers (job schedulers, API layers) can match on.
pub trait GuardErrorCode {
    /// Returns the error code string (e.g., "LOCK_TIMEOUT").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn display_code(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const POLICY_INVALID: &str = "POLICY_INVALID";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const TRANSACTION_FAILED: &str = "TRANSACTION_FAILED";
pub const GATEWAY_ERROR: &str = "GATEWAY_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
pub const LOCK_TIMEOUT: &str = "LOCK_TIMEOUT";
pub const LOCK_ERROR: &str = "LOCK_ERROR";
pub const COMMENT_SYNC_FAILED: &str = "COMMENT_SYNC_FAILED";
