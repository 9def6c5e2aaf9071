//! Collaborator traits consumed by the engine.
//!
//! The engine depends on these seams only; the storage crate and the host
//! platform provide implementations.

pub mod comments;
pub mod findings;
pub mod lock;
pub mod merge_requests;
pub mod violations;

pub use comments::CommentGateway;
pub use findings::{
    CountQuery, FindingsGateway, FindingsQuery, VulnerabilityCount, VulnerabilityCountingGateway,
};
pub use lock::{LeaseToken, LockService};
pub use merge_requests::MergeRequestGateway;
pub use violations::ViolationStore;
