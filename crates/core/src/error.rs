//! Error types for the insider-signal pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the insider-signal pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A raw record or nested transaction entry could not be parsed.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Source tag does not name a known upstream schema.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed record error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedRecord(msg.into())
    }

    /// Create an unknown source error.
    pub fn unknown_source(msg: impl Into<String>) -> Self {
        Error::UnknownSource(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error only affects a single record or entry.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedRecord(_))
    }
}
