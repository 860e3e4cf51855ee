//! Delivery of one notification email: the task, the SMTP sequence that
//! sends it, and the retry runner that drives attempts.

mod retry;
mod smtp;
mod task;

pub use retry::{ATTEMPTS, BACKOFF, RetryOutcome, RetryRunner};
pub use smtp::{Mailer, SmtpMailer, deliver};
pub use task::DeliveryTask;
