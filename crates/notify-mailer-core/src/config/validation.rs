//! Completeness checks for a configuration snapshot.
//!
//! The day set is not part of completeness: an empty set is a valid
//! configuration that simply never matches a weekday. Sender and
//! recipients must also be usable envelope addresses, since no retry can
//! fix a malformed one.

use super::model::ConfigSnapshot;
use notify_mailer_smtp::Address;
use tracing::warn;

/// A required setting that is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Start time is empty.
    MissingStartTime,
    /// Stop time is empty.
    MissingStopTime,
    /// SMTP host is empty.
    MissingHost,
    /// SMTP port is zero.
    MissingPort,
    /// SMTP username is empty.
    MissingUsername,
    /// SMTP password is empty.
    MissingPassword,
    /// Sender address is empty.
    MissingSender,
    /// Sender is not a usable envelope address.
    InvalidSender,
    /// No recipients.
    MissingRecipients,
    /// A recipient is not a usable envelope address.
    InvalidRecipient,
}

impl ConfigError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingStartTime => "Start time is required",
            Self::MissingStopTime => "Stop time is required",
            Self::MissingHost => "SMTP server is required",
            Self::MissingPort => "SMTP port must be 1-65535",
            Self::MissingUsername => "SMTP username is required",
            Self::MissingPassword => "SMTP password is required",
            Self::MissingSender => "Sender address is required",
            Self::InvalidSender => "Sender address is invalid",
            Self::MissingRecipients => "At least one recipient is required",
            Self::InvalidRecipient => "Recipient address is invalid",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingStartTime => "start_time",
            Self::MissingStopTime => "stop_time",
            Self::MissingHost => "host",
            Self::MissingPort => "port",
            Self::MissingUsername => "username",
            Self::MissingPassword => "password",
            Self::MissingSender | Self::InvalidSender => "sender",
            Self::MissingRecipients | Self::InvalidRecipient => "recipients",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConfigError {}

/// Result of validating a snapshot.
pub type ValidationResult = Result<(), Vec<ConfigError>>;

/// Validate a configuration snapshot.
///
/// Returns `Ok(())` if every required setting is present, or all missing
/// settings in declaration order.
///
/// # Errors
///
/// Returns a vector of `ConfigError` if any required setting is missing.
pub fn validate(config: &ConfigSnapshot) -> ValidationResult {
    let mut errors = Vec::new();

    if config.start_time.trim().is_empty() {
        errors.push(ConfigError::MissingStartTime);
    }
    if config.stop_time.trim().is_empty() {
        errors.push(ConfigError::MissingStopTime);
    }

    if config.host.trim().is_empty() {
        errors.push(ConfigError::MissingHost);
    }
    if config.port == 0 {
        errors.push(ConfigError::MissingPort);
    }
    if config.username.trim().is_empty() {
        errors.push(ConfigError::MissingUsername);
    }
    if config.password.is_empty() {
        errors.push(ConfigError::MissingPassword);
    }

    if config.sender.trim().is_empty() {
        errors.push(ConfigError::MissingSender);
    } else if Address::new(&config.sender).is_err() {
        errors.push(ConfigError::InvalidSender);
    }
    if config.recipients.is_empty() {
        errors.push(ConfigError::MissingRecipients);
    } else if config.recipients.iter().any(|r| Address::new(r).is_err()) {
        errors.push(ConfigError::InvalidRecipient);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl ConfigSnapshot {
    /// Returns true when every required setting is present.
    ///
    /// Each missing setting is logged at warn level.
    #[must_use]
    pub fn has_all_required(&self) -> bool {
        match validate(self) {
            Ok(()) => true,
            Err(errors) => {
                for error in &errors {
                    warn!(field = error.field(), "{}", error.message());
                }
                false
            }
        }
    }
}
