//! Tests for tracing initialization.

use std::sync::Mutex;

use scalebench_core::tracing::init_tracing;

/// Serializes tests that touch `SCALEBENCH_LOG`.
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn per_module_filter_is_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(
        "SCALEBENCH_LOG",
        "scalebench::orchestrator=debug,scalebench::comparator=warn",
    );
    init_tracing();
    tracing::debug!(operation = "noop", "tracing initialized");
    std::env::remove_var("SCALEBENCH_LOG");
}

#[test]
fn repeated_init_is_harmless() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}

#[test]
fn garbage_filter_falls_back_to_default() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("SCALEBENCH_LOG", "[[[not a filter");
    init_tracing();
    std::env::remove_var("SCALEBENCH_LOG");
}
