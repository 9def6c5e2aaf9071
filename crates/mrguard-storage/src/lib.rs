//! mrguard-storage: SQLite persistence for violations, approval rules,
//! bot comments, and exclusive leases.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use store::{
    SqliteCommentGateway, SqliteLeaseLock, SqliteMergeRequestGateway, SqliteViolationStore,
};
