//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging.
///
/// Reads `MRGUARD_LOG` for per-subsystem log levels, e.g.
/// `MRGUARD_LOG=mrguard_engine=debug,mrguard_storage=warn`.
/// Falls back to `mrguard=info` when unset or invalid. Idempotent.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("MRGUARD_LOG")
            .unwrap_or_else(|_| EnvFilter::new("mrguard=info"));

        // A host that installed its own subscriber keeps it.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
