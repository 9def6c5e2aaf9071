//! SQLite implementations of the collaborator traits.

mod comments;
mod lease_lock;
mod merge_requests;
mod violations;

pub use comments::SqliteCommentGateway;
pub use lease_lock::SqliteLeaseLock;
pub use merge_requests::SqliteMergeRequestGateway;
pub use violations::SqliteViolationStore;

use mrguard_core::errors::StorageError;

fn corrupt(table: &str, e: impl std::fmt::Display) -> StorageError {
    StorageError::CorruptRow {
        table: table.to_string(),
        message: e.to_string(),
    }
}
