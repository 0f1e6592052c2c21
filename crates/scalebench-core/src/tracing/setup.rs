//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "SCALEBENCH_LOG";

/// Default filter when `SCALEBENCH_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "scalebench=info";

/// Initialize the scalebench tracing subscriber.
///
/// Reads `SCALEBENCH_LOG` for per-module levels, e.g.
/// `SCALEBENCH_LOG=scalebench::orchestrator=debug,scalebench::comparator=warn`.
///
/// Idempotent. Does nothing if another global subscriber is already set.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

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
