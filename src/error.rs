//! Error types

use thiserror::Error;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for upload operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was missing when the upload was dispatched
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The multipart body could not be encoded
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The server answered with a non-success status
    #[error("HTTP status {status}: {reason}")]
    HttpStatus {
        /// Status code from the response
        status: u16,
        /// Reason phrase for the status code
        reason: String,
    },

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("request timed out")]
    Timeout,

    /// UTF-8 conversion error
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
