//! Delivery configuration: stored preferences, the immutable snapshot taken
//! per event, validation, and where preferences come from.

mod model;
mod source;
mod validation;

pub use model::{ConfigSnapshot, DeviceIdentity, Preferences, parse_recipients};
pub use source::{ConfigSource, FileConfigSource, StaticConfigSource};
pub use validation::{ConfigError, ValidationResult, validate};

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{DeviceIdentity, Preferences};

    /// Enabled preferences with every field filled and a window covering
    /// the whole week.
    pub fn complete_preferences() -> Preferences {
        Preferences {
            enabled: true,
            days: (1..=7).collect(),
            start_time: "00:00".into(),
            stop_time: "23:59".into(),
            host: "smtp.example.com".into(),
            port: 587,
            username: "phone@example.com".into(),
            password: "secret".into(),
            sender: "phone@example.com".into(),
            recipients: "me@example.org".into(),
            device: DeviceIdentity {
                manufacturer: "Acme".into(),
                model: "Pager 3".into(),
            },
        }
    }

    /// Settings that make a configuration complete.
    pub const REQUIRED: [&str; 8] = [
        "start_time",
        "stop_time",
        "host",
        "port",
        "username",
        "password",
        "sender",
        "recipients",
    ];

    /// Complete preferences with one required setting cleared.
    pub fn without(field: &str) -> Preferences {
        let mut prefs = complete_preferences();
        match field {
            "start_time" => prefs.start_time.clear(),
            "stop_time" => prefs.stop_time.clear(),
            "host" => prefs.host = "  ".into(),
            "port" => prefs.port = 0,
            "username" => prefs.username.clear(),
            "password" => prefs.password.clear(),
            "sender" => prefs.sender.clear(),
            "recipients" => prefs.recipients = " \t".into(),
            other => panic!("unknown field {other}"),
        }
        prefs
    }
}
