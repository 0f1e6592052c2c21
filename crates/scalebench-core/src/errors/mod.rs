//! Error handling for scalebench.
//! One error enum per subsystem, `thiserror` only.
//!
//! Measurement faults are not errors: they are recorded in-band on the
//! affected sample. Only configuration problems found before a sweep starts
//! and persistence I/O surface as `Err`.

pub mod config_error;
pub mod error_code;
pub mod persistence_error;
pub mod sweep_error;

pub use config_error::ConfigError;
pub use error_code::ErrorCode;
pub use persistence_error::PersistenceError;
pub use sweep_error::SweepError;
