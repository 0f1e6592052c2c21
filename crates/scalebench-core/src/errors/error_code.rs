//! Stable machine-readable codes for CI consumers.

/// Every error enum implements this so reports and CI logs can key on a
/// code string instead of parsing messages.
pub trait ErrorCode {
    /// Returns the code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const DUPLICATE_OPERATION: &str = "DUPLICATE_OPERATION";
pub const UNKNOWN_OPERATION: &str = "UNKNOWN_OPERATION";
pub const DUPLICATE_THRESHOLD: &str = "DUPLICATE_THRESHOLD";
pub const INVALID_DIMENSION: &str = "INVALID_DIMENSION";
pub const PERSISTENCE_IO: &str = "PERSISTENCE_IO";
pub const PERSISTENCE_FORMAT: &str = "PERSISTENCE_FORMAT";
