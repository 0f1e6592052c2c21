//! Sweep setup errors.

use super::error_code::ErrorCode;
use super::ConfigError;

/// Errors that prevent a sweep from starting.
///
/// Anything that goes wrong once measurement has begun is recorded on the
/// affected sample instead.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ErrorCode for SweepError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
        }
    }
}
