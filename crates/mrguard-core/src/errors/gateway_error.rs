//! Errors returned by external collaborators (findings, counting, comments,
//! merge request access).

use super::error_code::{self, GuardErrorCode};
use super::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{gateway} unavailable: {message}")]
    Unavailable { gateway: &'static str, message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Field-level validation messages reported by the write side.
    #[error("Validation failed: {}", .messages.join(", "))]
    Validation { messages: Vec<String> },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl GuardErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Validation { .. } => error_code::VALIDATION_FAILED,
            Self::Storage(e) => e.error_code(),
            Self::Unavailable { .. } => error_code::GATEWAY_ERROR,
        }
    }
}
