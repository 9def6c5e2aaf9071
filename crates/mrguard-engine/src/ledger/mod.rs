//! Per-pass violation accumulation and transactional write.

mod violation_ledger;

pub use violation_ledger::{LedgerSummary, ViolationLedger};
