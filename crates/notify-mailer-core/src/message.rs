//! Composition of the notification email.
//!
//! The message is a header block with an empty body; the subject carries
//! all the information.

use crate::config::DeviceIdentity;
use crate::error::{Error, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::{Display, Write};
use uuid::Uuid;

/// Domain part of generated Message-Ids.
pub const MESSAGE_ID_DOMAIN: &str = "android.invalid";

/// RFC 2822 date layout used for the `Date` header.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Builds notification emails on behalf of one device.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    device: DeviceIdentity,
}

impl MessageComposer {
    /// Creates a composer for `device`.
    #[must_use]
    pub const fn new(device: DeviceIdentity) -> Self {
        Self { device }
    }

    /// Returns the device identity.
    #[must_use]
    pub const fn device(&self) -> &DeviceIdentity {
        &self.device
    }

    /// Composes a message dated in local time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `recipients` is empty.
    pub fn compose(
        &self,
        subject: &str,
        at: DateTime<Utc>,
        sender: &str,
        recipients: &[String],
    ) -> Result<String> {
        self.compose_in(subject, at, &Local, sender, recipients)
    }

    /// Composes a message dated in `tz`.
    ///
    /// Every call mints a new Message-Id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `recipients` is empty.
    pub fn compose_in<Tz>(
        &self,
        subject: &str,
        at: DateTime<Utc>,
        tz: &Tz,
        sender: &str,
        recipients: &[String],
    ) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if recipients.is_empty() {
            return Err(Error::InvalidArgument("no recipients"));
        }

        let to = recipients
            .iter()
            .map(|r| format!("<{r}>"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut message = String::new();
        let _ = write!(message, "Message-Id: <{}@{MESSAGE_ID_DOMAIN}>\r\n", Uuid::new_v4());
        let _ = write!(message, "Date: {}\r\n", at.with_timezone(tz).format(DATE_FORMAT));
        let _ = write!(message, "Subject: {subject}\r\n");
        let _ = write!(message, "From: {} <{sender}>\r\n", self.device);
        let _ = write!(message, "To: {to}\r\n");
        message.push_str("Content-Type: text/plain; charset=UTF-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");
        message.push_str("X-Auto-Response-Suppress: OOF\r\n");
        message.push_str("\r\n");

        Ok(message)
    }
}
