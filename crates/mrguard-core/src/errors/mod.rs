//! Error handling for mrguard.
//! One error enum per subsystem, `thiserror` only.

pub mod comment_error;
pub mod config_error;
pub mod enforcement_error;
pub mod error_code;
pub mod gateway_error;
pub mod lock_error;
pub mod storage_error;

pub use comment_error::CommentSyncError;
pub use config_error::ConfigError;
pub use enforcement_error::EnforcementError;
pub use error_code::GuardErrorCode;
pub use gateway_error::GatewayError;
pub use lock_error::LockError;
pub use storage_error::StorageError;
