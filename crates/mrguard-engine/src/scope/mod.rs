//! Policy scope matching.

mod matcher;

pub use matcher::PolicyScopeMatcher;
