//! SBI Error Types
//!
//! Error types for the SBI library

use thiserror::Error;

/// SBI Error type
#[derive(Error, Debug)]
pub enum SbiError {
    /// Invalid URI or bind address
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Request body missing where one is required
    #[error("Missing request body")]
    MissingBody,
}

/// SBI Result type
pub type SbiResult<T> = Result<T, SbiError>;
