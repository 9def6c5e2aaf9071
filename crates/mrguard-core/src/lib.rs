//! mrguard-core: shared types, collaborator traits, errors, configuration,
//! tracing setup, and constants for the merge-request policy engine.

pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;
pub mod tracing;
pub mod types;
