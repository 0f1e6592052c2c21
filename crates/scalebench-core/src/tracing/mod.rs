//! Observability for scalebench.
//! `tracing` crate with `EnvFilter`, per-module log levels.
//!
//! Components log with the structured keys `operation`, `point`, `fault`,
//! `cv`, `label` and `pct_diff` so log queries match across modules.

pub mod setup;

pub use setup::init_tracing;
