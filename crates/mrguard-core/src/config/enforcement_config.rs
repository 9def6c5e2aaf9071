//! Feature flags for the enforcement pass.

use serde::{Deserialize, Serialize};

/// Enforcement feature flags as written in `mrguard.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnforcementConfig {
    /// Honor `fallback_behavior: { fail: open }` on policies. Default: true.
    pub fallback_behavior_enabled: Option<bool>,
    /// Treat pipelines waiting on manual jobs as complete. Default: false.
    pub include_manual_to_pipeline_completion: Option<bool>,
    /// Persist detailed violation data and render the detailed comment.
    /// Default: true.
    pub save_policy_violation_data: Option<bool>,
    /// Default: false.
    pub bulk_license_policy_creation: Option<bool>,
    /// Rewrite an existing comment once every violation is resolved.
    /// Default: false.
    pub announce_resolution: Option<bool>,
}

impl EnforcementConfig {
    /// Resolve the optional values into plain flags.
    pub fn flags(&self) -> EnforcementFlags {
        EnforcementFlags {
            fallback_behavior_enabled: self.fallback_behavior_enabled.unwrap_or(true),
            include_manual_to_pipeline_completion: self
                .include_manual_to_pipeline_completion
                .unwrap_or(false),
            save_policy_violation_data: self.save_policy_violation_data.unwrap_or(true),
            bulk_license_policy_creation: self.bulk_license_policy_creation.unwrap_or(false),
            announce_resolution: self.announce_resolution.unwrap_or(false),
        }
    }
}

/// Resolved enforcement flags, read once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnforcementFlags {
    pub fallback_behavior_enabled: bool,
    pub include_manual_to_pipeline_completion: bool,
    pub save_policy_violation_data: bool,
    pub bulk_license_policy_creation: bool,
    pub announce_resolution: bool,
}

impl Default for EnforcementFlags {
    fn default() -> Self {
        EnforcementConfig::default().flags()
    }
}
