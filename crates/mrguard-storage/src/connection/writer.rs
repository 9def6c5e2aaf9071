//! Write connection utilities: BEGIN IMMEDIATE transactions.

use mrguard_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// The write lock is taken at transaction start, so later statements cannot
/// fail with SQLITE_BUSY. Any error from `f` rolls the transaction back.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|e| {
        match e.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) => StorageError::DbBusy,
            _ => StorageError::SqliteError {
                message: format!("failed to begin immediate transaction: {e}"),
            },
        }
    })?;

    // Dropped without commit on error: rolls back.
    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::TransactionFailed {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}
