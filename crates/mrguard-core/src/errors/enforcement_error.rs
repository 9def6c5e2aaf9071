//! Errors that abort an enforcement pass.

use super::error_code::GuardErrorCode;
use super::{ConfigError, GatewayError, LockError, StorageError};

/// Errors that abort an enforcement pass and are reported upward for retry
/// scheduling. Aggregates subsystem errors via `From` conversions. Rule-level
/// evaluation errors never surface here; they become violation evidence.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl GuardErrorCode for EnforcementError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Gateway(e) => e.error_code(),
            Self::Lock(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
