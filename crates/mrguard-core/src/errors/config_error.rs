//! Configuration errors.

use super::error_code::{self, GuardErrorCode};

/// Errors that can occur during configuration and policy loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Invalid policy '{policy}': {message}")]
    InvalidPolicy { policy: String, message: String },
}

impl GuardErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPolicy { .. } => error_code::POLICY_INVALID,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
