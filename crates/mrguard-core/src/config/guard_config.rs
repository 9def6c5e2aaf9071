//! Top-level mrguard configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{CommentConfig, EnforcementConfig, LockConfig, StorageConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`MRGUARD_*`)
/// 3. Project config (`mrguard.toml` in project root)
/// 4. User config (`~/.mrguard/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    pub enforcement: EnforcementConfig,
    pub comment: CommentConfig,
    pub lock: LockConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_path: Option<String>,
    pub bot_username: Option<String>,
    pub save_policy_violation_data: Option<bool>,
    pub announce_resolution: Option<bool>,
}

impl GuardConfig {
    /// Load configuration with 4-layer resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message: "invalid TOML in user config".to_string(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join("mrguard.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &GuardConfig) -> Result<(), ConfigError> {
        if config.lock.sleep_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "lock.sleep_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.lock.retries == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "lock.retries".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.lock.ttl_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "lock.ttl_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.comment.max_violations == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "comment.max_violations".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(ref name) = config.comment.bot_username {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "comment.bot_username".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut GuardConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: GuardConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut GuardConfig, other: &GuardConfig) {
        // Enforcement
        let (b, o) = (&mut base.enforcement, &other.enforcement);
        if o.fallback_behavior_enabled.is_some() {
            b.fallback_behavior_enabled = o.fallback_behavior_enabled;
        }
        if o.include_manual_to_pipeline_completion.is_some() {
            b.include_manual_to_pipeline_completion = o.include_manual_to_pipeline_completion;
        }
        if o.save_policy_violation_data.is_some() {
            b.save_policy_violation_data = o.save_policy_violation_data;
        }
        if o.bulk_license_policy_creation.is_some() {
            b.bulk_license_policy_creation = o.bulk_license_policy_creation;
        }
        if o.announce_resolution.is_some() {
            b.announce_resolution = o.announce_resolution;
        }

        // Comment
        if other.comment.bot_username.is_some() {
            base.comment.bot_username = other.comment.bot_username.clone();
        }
        if other.comment.max_violations.is_some() {
            base.comment.max_violations = other.comment.max_violations;
        }

        // Lock
        if other.lock.ttl_ms.is_some() {
            base.lock.ttl_ms = other.lock.ttl_ms;
        }
        if other.lock.sleep_ms.is_some() {
            base.lock.sleep_ms = other.lock.sleep_ms;
        }
        if other.lock.retries.is_some() {
            base.lock.retries = other.lock.retries;
        }

        // Storage
        if other.storage.database_path.is_some() {
            base.storage.database_path = other.storage.database_path.clone();
        }
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `MRGUARD_LOCK_TTL_MS`, `MRGUARD_COMMENT_BOT_USERNAME`, etc.
    fn apply_env_overrides(config: &mut GuardConfig) {
        if let Some(v) = env_bool("MRGUARD_FALLBACK_BEHAVIOR_ENABLED") {
            config.enforcement.fallback_behavior_enabled = Some(v);
        }
        if let Some(v) = env_bool("MRGUARD_INCLUDE_MANUAL_TO_PIPELINE_COMPLETION") {
            config.enforcement.include_manual_to_pipeline_completion = Some(v);
        }
        if let Some(v) = env_bool("MRGUARD_SAVE_POLICY_VIOLATION_DATA") {
            config.enforcement.save_policy_violation_data = Some(v);
        }
        if let Some(v) = env_bool("MRGUARD_ANNOUNCE_RESOLUTION") {
            config.enforcement.announce_resolution = Some(v);
        }
        if let Ok(val) = std::env::var("MRGUARD_COMMENT_BOT_USERNAME") {
            config.comment.bot_username = Some(val);
        }
        if let Ok(val) = std::env::var("MRGUARD_LOCK_TTL_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.lock.ttl_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("MRGUARD_LOCK_SLEEP_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.lock.sleep_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("MRGUARD_LOCK_RETRIES") {
            if let Ok(v) = val.parse::<u32>() {
                config.lock.retries = Some(v);
            }
        }
        if let Ok(val) = std::env::var("MRGUARD_DATABASE_PATH") {
            config.storage.database_path = Some(val);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut GuardConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.database_path {
            config.storage.database_path = Some(v.clone());
        }
        if let Some(ref v) = cli.bot_username {
            config.comment.bot_username = Some(v.clone());
        }
        if let Some(v) = cli.save_policy_violation_data {
            config.enforcement.save_policy_violation_data = Some(v);
        }
        if let Some(v) = cli.announce_resolution {
            config.enforcement.announce_resolution = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| v.parse::<bool>().ok())
}

/// Returns the user-level config directory: `~/.mrguard/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".mrguard"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
