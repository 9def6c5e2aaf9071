//! Named exclusive lock service.

use std::time::Duration;

use crate::errors::LockError;

/// Proof of lease ownership; required to release.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeaseToken(String);

impl LeaseToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Non-blocking lease primitive. Waiting and retry policy live in the
/// engine's `in_lock` helper.
pub trait LockService: Send + Sync {
    /// Try to take the lease for `key`. `Ok(None)` when it is held by
    /// someone else and has not expired.
    fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LeaseToken>, LockError>;

    /// Release the lease if `token` still owns it.
    fn release(&self, key: &str, token: &LeaseToken) -> Result<(), LockError>;
}
