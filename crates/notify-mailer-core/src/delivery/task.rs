//! Delivery task.

use crate::config::ConfigSnapshot;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// One email to send, with the configuration captured when it was created.
#[derive(Debug, Clone)]
pub struct DeliveryTask {
    subject: String,
    event_time: DateTime<Utc>,
    config: Arc<ConfigSnapshot>,
}

impl DeliveryTask {
    /// Creates a delivery task.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        event_time: DateTime<Utc>,
        config: Arc<ConfigSnapshot>,
    ) -> Self {
        Self {
            subject: subject.into(),
            event_time,
            config,
        }
    }

    /// Email subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// When the triggering event was posted.
    #[must_use]
    pub const fn event_time(&self) -> DateTime<Utc> {
        self.event_time
    }

    /// Configuration snapshot.
    #[must_use]
    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }
}

impl fmt::Display for DeliveryTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at {}", self.subject, self.event_time.to_rfc3339())
    }
}
