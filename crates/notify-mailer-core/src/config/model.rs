//! Configuration model types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Device identity shown in the `From` display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceIdentity {
    /// Maker of the device.
    pub manufacturer: String,
    /// Model of the device.
    pub model: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            manufacturer: std::env::consts::OS.to_string(),
            model: std::env::consts::ARCH.to_string(),
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.manufacturer, self.model)
    }
}

/// Preferences as stored on disk.
///
/// Every key is optional; absent keys read as empty, zero or disabled.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Master switch.
    pub enabled: bool,
    /// Weekdays on which mail may be sent (1 = Sunday ... 7 = Saturday).
    pub days: BTreeSet<u32>,
    /// Start of the daily window, `HH:MM`.
    pub start_time: String,
    /// End of the daily window, `HH:MM`, inclusive.
    pub stop_time: String,
    /// Mail submission server.
    pub host: String,
    /// Submission port; 0 means unset.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Envelope and header sender.
    pub sender: String,
    /// Recipients separated by whitespace.
    pub recipients: String,
    /// Device identity for the `From` header.
    pub device: DeviceIdentity,
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("enabled", &self.enabled)
            .field("days", &self.days)
            .field("start_time", &self.start_time)
            .field("stop_time", &self.stop_time)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("recipients", &self.recipients)
            .field("device", &self.device)
            .finish()
    }
}

/// Immutable copy of everything one delivery decision needs.
///
/// Captured once per event and never re-read, so edits made while a
/// delivery is in flight cannot change it halfway.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Master switch at capture time.
    pub enabled: bool,
    /// Weekday identifiers on which delivery is allowed.
    pub active_days: BTreeSet<u32>,
    /// Start of the daily window, `HH:MM`.
    pub start_time: String,
    /// End of the daily window, `HH:MM`, inclusive.
    pub stop_time: String,
    /// Mail submission server.
    pub host: String,
    /// Submission port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Envelope and header sender.
    pub sender: String,
    /// Recipients in configured order.
    pub recipients: Vec<String>,
    /// Device identity for the `From` header.
    pub device: DeviceIdentity,
}

impl ConfigSnapshot {
    /// Captures a snapshot of `prefs`.
    #[must_use]
    pub fn capture(prefs: &Preferences) -> Self {
        Self {
            enabled: prefs.enabled,
            active_days: prefs.days.clone(),
            start_time: prefs.start_time.clone(),
            stop_time: prefs.stop_time.clone(),
            host: prefs.host.trim().to_string(),
            port: prefs.port,
            username: prefs.username.clone(),
            password: prefs.password.clone(),
            sender: prefs.sender.trim().to_string(),
            recipients: parse_recipients(&prefs.recipients),
            device: prefs.device.clone(),
        }
    }
}

impl From<&Preferences> for ConfigSnapshot {
    fn from(prefs: &Preferences) -> Self {
        Self::capture(prefs)
    }
}

impl fmt::Debug for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSnapshot")
            .field("enabled", &self.enabled)
            .field("active_days", &self.active_days)
            .field("start_time", &self.start_time)
            .field("stop_time", &self.stop_time)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("recipients", &self.recipients)
            .field("device", &self.device)
            .finish()
    }
}

/// Splits the stored recipient string on whitespace.
///
/// Empty or whitespace-only input yields no recipients.
#[must_use]
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn recipients_split_on_whitespace() {
        assert_eq!(
            parse_recipients("a@example.com  b@example.com\tc@example.com"),
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
        assert!(parse_recipients("").is_empty());
        assert!(parse_recipients(" \t ").is_empty());
    }

    #[test]
    fn missing_keys_take_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"host": "smtp.example.com"}"#).unwrap();
        assert!(!prefs.enabled);
        assert!(prefs.days.is_empty());
        assert_eq!(prefs.port, 0);
        assert_eq!(prefs.host, "smtp.example.com");
        assert_eq!(prefs.device, DeviceIdentity::default());
    }

    #[test]
    fn snapshot_copies_and_parses() {
        let prefs: Preferences = serde_json::from_str(
            r#"{
                "enabled": true,
                "days": [1, 7],
                "start_time": "08:00",
                "stop_time": "22:30",
                "host": " smtp.example.com ",
                "port": 587,
                "username": "phone",
                "password": "hunter2",
                "sender": "phone@example.com",
                "recipients": "me@example.org you@example.org",
                "device": {"manufacturer": "Acme", "model": "Pager 3"}
            }"#,
        )
        .unwrap();

        let snapshot = ConfigSnapshot::capture(&prefs);
        assert!(snapshot.enabled);
        assert_eq!(snapshot.active_days, BTreeSet::from([1, 7]));
        assert_eq!(snapshot.host, "smtp.example.com");
        assert_eq!(snapshot.recipients, vec!["me@example.org", "you@example.org"]);
        assert_eq!(snapshot.device.to_string(), "Acme Pager 3");
    }

    #[test]
    fn debug_hides_password() {
        let prefs = Preferences {
            password: "hunter2".into(),
            ..Preferences::default()
        };
        assert!(!format!("{prefs:?}").contains("hunter2"));
        assert!(!format!("{:?}", ConfigSnapshot::capture(&prefs)).contains("hunter2"));
    }
}
