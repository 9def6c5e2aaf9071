//! Configuration system for mrguard.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod comment_config;
pub mod enforcement_config;
pub mod guard_config;
pub mod lock_config;
pub mod storage_config;

pub use comment_config::CommentConfig;
pub use enforcement_config::{EnforcementConfig, EnforcementFlags};
pub use guard_config::{CliOverrides, GuardConfig};
pub use lock_config::LockConfig;
pub use storage_config::StorageConfig;
