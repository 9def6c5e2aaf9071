//! Exclusive lock timing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LOCK_RETRIES, DEFAULT_LOCK_SLEEP_MS, DEFAULT_LOCK_TTL_MS};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LockConfig {
    /// Lease lifetime in milliseconds. Default: 10000.
    pub ttl_ms: Option<u64>,
    /// Sleep between attempts in milliseconds. Default: 100.
    pub sleep_ms: Option<u64>,
    /// Attempts after the first one. Default: 50.
    pub retries: Option<u32>,
}

impl LockConfig {
    pub fn effective_ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.unwrap_or(DEFAULT_LOCK_TTL_MS))
    }

    pub fn effective_sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_ms.unwrap_or(DEFAULT_LOCK_SLEEP_MS))
    }

    pub fn effective_retries(&self) -> u32 {
        self.retries.unwrap_or(DEFAULT_LOCK_RETRIES)
    }

    /// Upper bound on the time spent waiting for the lock.
    pub fn max_wait(&self) -> Duration {
        self.effective_sleep() * self.effective_retries()
    }
}
