//! Error types for the encoder.
//!
//! Unknown features and unknown intents are not errors: they are resolved
//! through the unknown-index fallback or an empty output vector. Only
//! configuration and snapshot consistency problems surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoderError {
    /// Rejected encoder configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Snapshot whose contents cannot rebuild a consistent encoder
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CBOR serialization/deserialization errors
    #[error("CBOR error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

/// Result type alias for operations that may fail with EncoderError.
pub type Result<T> = std::result::Result<T, EncoderError>;

impl EncoderError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        EncoderError::InvalidConfig(msg.into())
    }

    pub fn malformed_snapshot<S: Into<String>>(msg: S) -> Self {
        EncoderError::MalformedSnapshot(msg.into())
    }
}
