//! Queries for the `exclusive_leases` table.

use rusqlite::{params, Connection};

use mrguard_core::errors::StorageError;

use super::sqlite_err;

/// Take the lease for `key` unless a live lease exists. Expired leases are
/// replaced. Returns whether the lease was taken. Run inside a transaction.
pub fn try_insert_lease(
    conn: &Connection,
    key: &str,
    token: &str,
    now_ms: i64,
    expires_at_ms: i64,
) -> Result<bool, StorageError> {
    conn.execute(
        "DELETE FROM exclusive_leases WHERE lease_key = ?1 AND expires_at_ms <= ?2",
        params![key, now_ms],
    )
    .map_err(sqlite_err)?;

    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO exclusive_leases (lease_key, token, expires_at_ms) VALUES (?1, ?2, ?3)",
            params![key, token, expires_at_ms],
        )
        .map_err(sqlite_err)?;
    Ok(inserted == 1)
}

/// Delete the lease if `token` owns it. Returns whether a row was removed.
pub fn delete_lease(conn: &Connection, key: &str, token: &str) -> Result<bool, StorageError> {
    let deleted = conn
        .execute(
            "DELETE FROM exclusive_leases WHERE lease_key = ?1 AND token = ?2",
            params![key, token],
        )
        .map_err(sqlite_err)?;
    Ok(deleted == 1)
}

/// Current holder token for `key`, if any lease row exists.
pub fn query_lease_token(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT token FROM exclusive_leases WHERE lease_key = ?1")
        .map_err(sqlite_err)?;
    let mut rows = stmt
        .query_map(params![key], |row| row.get::<_, String>(0))
        .map_err(sqlite_err)?;
    rows.next().transpose().map_err(sqlite_err)
}
