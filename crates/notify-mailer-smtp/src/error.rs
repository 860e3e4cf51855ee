//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Connect, read or write did not finish in time.
    #[error("Timed out while {0}")]
    Timeout(&'static str),

    /// Server returned a reply other than the one the step requires.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code (e.g., 550).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Protocol error (malformed or truncated reply).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The configured host is not a valid DNS name or IP address.
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    /// The TLS session did not present a certificate.
    #[error("Server presented no certificate")]
    NoPeerCertificate,

    /// The server certificate is not valid for the configured host.
    #[error("Certificate does not match {host}: {reason}")]
    HostnameMismatch {
        /// Host the client connected to.
        host: String,
        /// Why the certificate was rejected.
        reason: String,
    },

    /// Operation requires a different connection state.
    #[error("Invalid state for operation: {0}")]
    InvalidState(&'static str),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::SmtpError { code, .. } if *code >= 500 && *code < 600)
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::SmtpError { code, .. } if *code >= 400 && *code < 500)
    }
}
