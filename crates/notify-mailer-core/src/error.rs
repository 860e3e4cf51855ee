//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// SMTP session failed.
    #[error("SMTP error: {0}")]
    Smtp(#[from] notify_mailer_smtp::Error),

    /// A caller passed an unusable argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
