//! Violation comment synchronization errors.

use super::error_code::{self, GuardErrorCode};
use super::{GatewayError, LockError, StorageError};

/// Failure reasons of a comment synchronization pass. Lock timeouts are kept
/// apart from write failures so callers can tell "could not synchronize"
/// from "nothing to report".
#[derive(Debug, thiserror::Error)]
pub enum CommentSyncError {
    #[error("Failed to obtain an exclusive lock")]
    LockTimeout { key: String, waited_ms: u64 },

    #[error("Comment rejected: {}", .messages.join(", "))]
    Validation { messages: Vec<String> },

    #[error("Comment gateway error: {0}")]
    Gateway(GatewayError),

    #[error("Lock error: {0}")]
    Lock(LockError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CommentSyncError {
    /// Messages suitable for surfacing to the caller.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { messages } => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<GatewayError> for CommentSyncError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation { messages } => Self::Validation { messages },
            other => Self::Gateway(other),
        }
    }
}

impl From<LockError> for CommentSyncError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::FailedToObtain { key, waited_ms, .. } => Self::LockTimeout { key, waited_ms },
            other => Self::Lock(other),
        }
    }
}

impl GuardErrorCode for CommentSyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LockTimeout { .. } => error_code::LOCK_TIMEOUT,
            Self::Validation { .. } => error_code::VALIDATION_FAILED,
            Self::Gateway(e) => e.error_code(),
            Self::Lock(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
        }
    }
}
