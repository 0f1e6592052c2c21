//! Result-set persistence errors.

use super::error_code::{self, ErrorCode};

/// Errors while saving or loading a result set.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed result set in {path}: {message}")]
    Format { path: String, message: String },
}

impl ErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::PERSISTENCE_IO,
            Self::Format { .. } => error_code::PERSISTENCE_FORMAT,
        }
    }
}
