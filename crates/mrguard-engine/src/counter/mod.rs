//! Vulnerability threshold evaluation.

mod vulnerability_counter;

pub use vulnerability_counter::{trim_fingerprints, CountOutcome, VulnerabilityCounter};
