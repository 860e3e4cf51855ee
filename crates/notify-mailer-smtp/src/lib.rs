//! # notify-mailer-smtp
//!
//! A small SMTP submission client: one connection, STARTTLS, `AUTH PLAIN`,
//! one message, with every step exposed so the caller controls sequencing
//! and logging.
//!
//! ## Features
//!
//! - **Bounded I/O**: connect, read, write and handshake all carry deadlines
//! - **STARTTLS**: in-place upgrade with rustls and the Mozilla root set
//! - **Endpoint identity**: explicit post-handshake check of the server
//!   certificate against the configured host
//! - **Extensions**: EHLO capabilities parsed; 8BITMIME and SIZE used when
//!   advertised
//!
//! ## Quick Start
//!
//! ```ignore
//! use notify_mailer_smtp::{Address, Client, Timeouts};
//!
//! # async fn run() -> notify_mailer_smtp::Result<()> {
//! let host = "smtp.example.com";
//! let mut client = Client::connect(host, 587, Timeouts::default()).await?;
//! client.read_greeting().await?;
//! client.ehlo().await?;
//! client.starttls(host).await?;
//! client.verify_peer_hostname(host)?;
//! client.ehlo().await?;
//! client.auth_plain("user@example.com", "password").await?;
//!
//! client.mail_from(&Address::new("user@example.com")?, None).await?;
//! client.rcpt_to(&Address::new("me@example.org")?).await?;
//! client.data().await?;
//! client.send_message(b"Subject: Test\r\n\r\n").await?;
//! client.quit().await?;
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Stream, session client and hostname verification
//! - [`parser`]: Reply parser
//! - [`types`]: Addresses, extensions, replies

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{Client, FALLBACK_HELO, ServerInfo, SmtpStream, Timeouts, helo_name};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};

/// TLS library used for STARTTLS, for callers supplying their own
/// [`rustls::ClientConfig`].
pub use rustls;
