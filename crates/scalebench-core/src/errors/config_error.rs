//! Configuration errors.

use super::error_code::{self, ErrorCode};
use crate::types::DimensionKind;

/// Problems detected while loading the TOML config or validating a sweep
/// plan. All of them are raised before any measurement begins.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Operation registered twice: {name}")]
    DuplicateOperation { name: String },

    #[error("Threshold references unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("More than one threshold declared for operation: {name}")]
    DuplicateThreshold { name: String },

    #[error("Dimension {kind} declared more than once")]
    DuplicateDimension { kind: DimensionKind },

    #[error("Dimension {kind} has no values")]
    EmptyDimension { kind: DimensionKind },

    #[error("Input sizes must be non-decreasing, got {previous} followed by {next}")]
    NonMonotonicSizes { previous: u64, next: u64 },

    #[error("Concurrency level must be at least 1")]
    ZeroConcurrency,

    #[error("Operation {operation}: size argument position {position} is out of range for {len} arguments")]
    ArgumentPosition {
        operation: String,
        position: usize,
        len: usize,
    },

    #[error("Operation {operation} needs generated arguments but no data generator was supplied")]
    MissingGenerator { operation: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateOperation { .. } => error_code::DUPLICATE_OPERATION,
            Self::UnknownOperation { .. } => error_code::UNKNOWN_OPERATION,
            Self::DuplicateThreshold { .. } => error_code::DUPLICATE_THRESHOLD,
            Self::DuplicateDimension { .. }
            | Self::EmptyDimension { .. }
            | Self::NonMonotonicSizes { .. }
            | Self::ZeroConcurrency => error_code::INVALID_DIMENSION,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
