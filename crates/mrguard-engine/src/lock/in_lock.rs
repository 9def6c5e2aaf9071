//! Sleep-and-retry acquisition around a `LockService`.

use std::time::Instant;

use mrguard_core::config::LockConfig;
use mrguard_core::constants::LOCK_NAMESPACE;
use mrguard_core::errors::LockError;
use mrguard_core::traits::LockService;
use mrguard_core::types::MergeRequestId;

/// Lock key serializing comment updates for one merge request.
pub fn lock_key(merge_request_id: MergeRequestId) -> String {
    format!("{LOCK_NAMESPACE}:{merge_request_id}")
}

/// Run `f` while holding the lease for `key`.
///
/// Tries once, then up to `retries` more times with a fixed `sleep` between
/// attempts. Gives up with `LockError::FailedToObtain`; `f` is not run in
/// that case. The lease is released after `f` returns, error or not.
pub fn in_lock<T, E, F>(
    service: &dyn LockService,
    key: &str,
    config: &LockConfig,
    f: F,
) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<LockError>,
{
    let ttl = config.effective_ttl();
    let sleep = config.effective_sleep();
    let attempts = config.effective_retries().saturating_add(1);
    let started = Instant::now();

    let mut token = None;
    for attempt in 1..=attempts {
        if let Some(acquired) = service.try_acquire(key, ttl)? {
            token = Some(acquired);
            break;
        }
        if attempt < attempts {
            std::thread::sleep(sleep);
        }
    }

    let Some(token) = token else {
        let waited_ms = started.elapsed().as_millis() as u64;
        tracing::warn!(key, attempts, waited_ms, "failed to obtain exclusive lock");
        return Err(LockError::FailedToObtain {
            key: key.to_string(),
            attempts,
            waited_ms,
        }
        .into());
    };

    let result = f();

    if let Err(e) = service.release(key, &token) {
        tracing::warn!(key, error = %e, "failed to release exclusive lock");
    }

    result
}
