//! Process-local lease table.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use mrguard_core::errors::LockError;
use mrguard_core::traits::{LeaseToken, LockService};
use mrguard_core::types::FxHashMap;

/// TTL leases held in memory. Serializes callers within one process only.
#[derive(Default)]
pub struct InMemoryLockService {
    leases: Mutex<FxHashMap<String, (LeaseToken, Instant)>>,
}

impl InMemoryLockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a live lease exists for `key`.
    pub fn is_locked(&self, key: &str) -> Result<bool, LockError> {
        let leases = self.leases.lock().map_err(|_| LockError::Poisoned {
            key: key.to_string(),
        })?;
        Ok(leases
            .get(key)
            .is_some_and(|(_, expires_at)| *expires_at > Instant::now()))
    }
}

impl LockService for InMemoryLockService {
    fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LeaseToken>, LockError> {
        let mut leases = self.leases.lock().map_err(|_| LockError::Poisoned {
            key: key.to_string(),
        })?;
        let now = Instant::now();
        if let Some((_, expires_at)) = leases.get(key) {
            if *expires_at > now {
                return Ok(None);
            }
        }
        let token = LeaseToken::generate();
        leases.insert(key.to_string(), (token.clone(), now + ttl));
        Ok(Some(token))
    }

    fn release(&self, key: &str, token: &LeaseToken) -> Result<(), LockError> {
        let mut leases = self.leases.lock().map_err(|_| LockError::Poisoned {
            key: key.to_string(),
        })?;
        if leases.get(key).is_some_and(|(owner, _)| owner == token) {
            leases.remove(key);
        }
        Ok(())
    }
}
