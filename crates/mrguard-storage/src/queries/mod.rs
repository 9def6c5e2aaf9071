//! Query modules: one per table group. Functions take `&Connection` so they
//! run on the writer, a pooled reader, or inside a transaction.

pub mod approval_rules;
pub mod leases;
pub mod notes;
pub mod pipelines;
pub mod violations;

use mrguard_core::errors::StorageError;

pub(crate) fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// `?1, ?2, ...` placeholders starting at `first`.
pub(crate) fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
