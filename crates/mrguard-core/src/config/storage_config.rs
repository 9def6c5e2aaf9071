//! SQLite storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. Default: `.mrguard/mrguard.db` under the project root.
    pub database_path: Option<String>,
    /// SQLite busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: Option<u32>,
}

impl StorageConfig {
    pub fn effective_database_path(&self, root: &std::path::Path) -> PathBuf {
        match &self.database_path {
            Some(path) => root.join(path),
            None => root.join(".mrguard").join("mrguard.db"),
        }
    }

    pub fn effective_busy_timeout_ms(&self) -> u32 {
        self.busy_timeout_ms.unwrap_or(5000)
    }
}
