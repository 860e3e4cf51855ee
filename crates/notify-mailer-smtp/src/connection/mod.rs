//! SMTP connection management.

mod client;
mod stream;
mod verify;

pub use client::Client;
pub use stream::{SmtpStream, Timeouts, connect};
pub use verify::verify_hostname;

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;
use std::net::IpAddr;

/// EHLO identity used when the local address is unknown.
pub const FALLBACK_HELO: &str = "android.invalid";

/// Server capabilities from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is advertised.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if 8BITMIME is advertised.
    #[must_use]
    pub fn supports_8bitmime(&self) -> bool {
        self.supports(&Extension::EightBitMime)
    }

    /// Returns true if SIZE is advertised, with or without a limit.
    #[must_use]
    pub fn supports_size(&self) -> bool {
        self.extensions
            .iter()
            .any(|ext| matches!(ext, Extension::Size(_)))
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns supported authentication mechanisms.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Formats the EHLO argument for a local address (RFC 5321 address literal).
///
/// IPv4-mapped IPv6 addresses are written in IPv4 form.
#[must_use]
pub fn helo_name(local: Option<IpAddr>) -> String {
    match local.map(|ip| ip.to_canonical()) {
        Some(IpAddr::V4(v4)) => format!("[{v4}]"),
        Some(IpAddr::V6(v6)) => format!("[IPv6:{v6}]"),
        None => FALLBACK_HELO.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn helo_literals() {
        assert_eq!(
            helo_name(Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)))),
            "[192.0.2.7]"
        );
        assert_eq!(
            helo_name(Some("2001:db8::25".parse().unwrap())),
            "[IPv6:2001:db8::25]"
        );
        assert_eq!(
            helo_name(Some(IpAddr::V6(Ipv4Addr::new(10, 1, 2, 3).to_ipv6_mapped()))),
            "[10.1.2.3]"
        );
        assert_eq!(helo_name(Some(IpAddr::V6(Ipv6Addr::LOCALHOST))), "[IPv6:::1]");
        assert_eq!(helo_name(None), "android.invalid");
    }

    #[test]
    fn capability_queries() {
        let info = ServerInfo {
            hostname: "mx.example.net".into(),
            extensions: [
                Extension::StartTls,
                Extension::Size(Some(1024)),
                Extension::Auth(vec![AuthMechanism::Plain]),
            ]
            .into_iter()
            .collect(),
        };
        assert!(info.supports_starttls());
        assert!(!info.supports_8bitmime());
        assert!(info.supports_size());
        assert_eq!(info.max_message_size(), Some(1024));
        assert_eq!(info.auth_mechanisms(), vec![AuthMechanism::Plain]);
        assert!(ServerInfo::default().auth_mechanisms().is_empty());
    }
}
