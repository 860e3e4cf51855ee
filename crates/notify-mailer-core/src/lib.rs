//! # notify-mailer-core
//!
//! Turns device notifications into email.
//!
//! This crate provides:
//! - Configuration snapshot, validation and sources
//! - Activity window evaluation
//! - Message composition
//! - SMTP delivery with a serialized retry runner
//! - Keep-awake scoping for background work
//! - Event classification and dispatch

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod delivery;
pub mod dispatch;
mod error;
pub mod keepalive;
pub mod message;
pub mod window;

pub use config::{
    ConfigError, ConfigSnapshot, ConfigSource, DeviceIdentity, FileConfigSource, Preferences,
    StaticConfigSource, ValidationResult, validate,
};
pub use delivery::{DeliveryTask, Mailer, RetryOutcome, RetryRunner, SmtpMailer};
pub use dispatch::{Dispatcher, FeedEvent, Notification, TaskSink, Trigger, Worker};
pub use error::{Error, Result};
pub use keepalive::{KeepAwake, NoKeepAwake, run_awake};
pub use message::MessageComposer;
pub use window::{TimeOfDay, is_active, is_active_in};
