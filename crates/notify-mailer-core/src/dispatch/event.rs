//! Notification events and trigger classification.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Icon resource of the system missed-call notification.
pub const MISSED_CALL_ICON: i64 = 0x0108_007f;

/// Notification category used by messaging apps.
pub const CATEGORY_MESSAGE: &str = "msg";

/// Applications whose message notifications are forwarded.
pub const CHAT_APPLICATIONS: &[&str] = &["com.google.android.talk"];

/// A posted or removed device notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification id.
    pub id: i64,
    /// Package that posted the notification.
    pub source_application: String,
    /// When it was posted, as milliseconds since the Unix epoch on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub post_time: DateTime<Utc>,
    /// Icon resource identifier.
    #[serde(default)]
    pub icon: i64,
    /// Notification category, if any.
    #[serde(default)]
    pub category: Option<String>,
}

/// Kind of event that warrants an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A call was missed.
    MissedCall,
    /// A chat message arrived.
    ChatMessage,
}

impl Trigger {
    /// Classifies a notification. Missed calls take precedence.
    #[must_use]
    pub fn classify(notification: &Notification) -> Option<Self> {
        if notification.icon == MISSED_CALL_ICON {
            return Some(Self::MissedCall);
        }

        let is_message = notification.category.as_deref() == Some(CATEGORY_MESSAGE);
        if is_message && CHAT_APPLICATIONS.contains(&notification.source_application.as_str()) {
            return Some(Self::ChatMessage);
        }

        None
    }

    /// Email subject for this trigger.
    #[must_use]
    pub const fn subject(self) -> &'static str {
        match self {
            Self::MissedCall => "Missed phone call",
            Self::ChatMessage => "Message received",
        }
    }
}

/// One line of the inbound event feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    /// The listener connected; `active` holds notifications already posted.
    Connected {
        /// Currently active notifications.
        #[serde(default)]
        active: Vec<Notification>,
    },
    /// A notification was posted.
    Posted(Notification),
    /// A notification was removed.
    Removed(Notification),
}

impl FeedEvent {
    /// Parses one JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a valid event.
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
