//! Exclusive lock errors.

use super::error_code::{self, GuardErrorCode};
use super::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Failed to obtain an exclusive lock for {key} after {attempts} attempts ({waited_ms}ms)")]
    FailedToObtain {
        key: String,
        attempts: u32,
        waited_ms: u64,
    },

    #[error("Lock state poisoned for {key}")]
    Poisoned { key: String },

    #[error("Lock backend error: {0}")]
    Backend(#[from] StorageError),
}

impl GuardErrorCode for LockError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FailedToObtain { .. } => error_code::LOCK_TIMEOUT,
            _ => error_code::LOCK_ERROR,
        }
    }
}
