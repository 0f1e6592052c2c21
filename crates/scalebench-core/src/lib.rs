//! # scalebench-core
//!
//! Foundation crate for the scalebench harness.
//! Provides the shared argument and dimension types, per-subsystem errors,
//! TOML configuration, tracing setup, and cooperative cancellation.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use errors::{ConfigError, ErrorCode, PersistenceError, SweepError};
pub use traits::{Cancellable, CancellationToken};
pub use types::{ArgValue, DimensionKind, DimensionPoint, ScalingDimension};
