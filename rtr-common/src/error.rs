//! Common error types for the release-to-royalty back office

use thiserror::Error;

/// Common result type for RTR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every RTR component
///
/// `Validation`, `NotFound`, `InvalidOperation` and `UnsupportedDsp` are
/// caller-facing and recoverable by correcting the request. Everything else is
/// an internal fault and must be surfaced as an opaque failure.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Well-formed request that violates a lifecycle precondition
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// DSP name without a payload mapping
    #[error("Unsupported DSP: {0}")]
    UnsupportedDsp(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
