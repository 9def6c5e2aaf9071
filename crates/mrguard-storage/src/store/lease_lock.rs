//! Exclusive leases backed by `exclusive_leases`.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mrguard_core::errors::LockError;
use mrguard_core::traits::{LeaseToken, LockService};

use crate::queries::leases as q;
use crate::DatabaseManager;

/// Lock service shared by every process using the same database file.
pub struct SqliteLeaseLock {
    db: Arc<DatabaseManager>,
}

impl SqliteLeaseLock {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Token of the current lease holder for `key`.
    pub fn holder(&self, key: &str) -> Result<Option<LeaseToken>, LockError> {
        let token = self.db.with_reader(|conn| q::query_lease_token(conn, key))?;
        Ok(token.map(LeaseToken::from_raw))
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl LockService for SqliteLeaseLock {
    fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LeaseToken>, LockError> {
        let token = LeaseToken::generate();
        let now = now_ms();
        let expires_at = now.saturating_add(ttl.as_millis() as i64);

        let acquired = self
            .db
            .with_transaction(|tx| q::try_insert_lease(tx, key, token.as_str(), now, expires_at))?;

        Ok(acquired.then_some(token))
    }

    fn release(&self, key: &str, token: &LeaseToken) -> Result<(), LockError> {
        let released = self
            .db
            .with_writer(|conn| q::delete_lease(conn, key, token.as_str()))?;
        if !released {
            tracing::warn!(key, "lease expired or taken over before release");
        }
        Ok(())
    }
}
