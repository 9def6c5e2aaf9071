//! Exclusive lock helpers.

mod in_lock;
mod memory;

pub use in_lock::{in_lock, lock_key};
pub use memory::InMemoryLockService;
