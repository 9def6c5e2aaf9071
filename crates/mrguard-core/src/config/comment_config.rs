//! Bot comment configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BOT_USERNAME, MAX_VIOLATIONS};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CommentConfig {
    /// Username of the comment author. Default: `security-policy-bot`.
    pub bot_username: Option<String>,
    /// Fingerprints kept per evidence list before trimming. Default: 10.
    pub max_violations: Option<usize>,
}

impl CommentConfig {
    pub fn effective_bot_username(&self) -> &str {
        self.bot_username.as_deref().unwrap_or(DEFAULT_BOT_USERNAME)
    }

    pub fn effective_max_violations(&self) -> usize {
        self.max_violations.unwrap_or(MAX_VIOLATIONS)
    }
}
