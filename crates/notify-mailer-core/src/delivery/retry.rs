//! Retry runner.
//!
//! A task gets [`ATTEMPTS`] attempts with a fixed [`BACKOFF`] between a
//! failure and the next attempt. Runners made with [`RetryRunner::new`]
//! share one process-wide lock held for the whole attempt sequence,
//! backoff included, so at most one delivery is in progress at any time.
//!
//! Errors returned by an attempt are logged and count as failures. A panic
//! inside an attempt is a defect and unwinds out of the runner. Once
//! shutdown is signalled, sequences still waiting for the lock end without
//! making an attempt.

use super::smtp::Mailer;
use super::task::DeliveryTask;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

/// Attempts per task.
pub const ATTEMPTS: u32 = 3;

/// Pause between a failed attempt and the next one.
pub const BACKOFF: Duration = Duration::from_secs(30);

static DELIVERY_LOCK: LazyLock<Arc<Mutex<()>>> = LazyLock::new(|| Arc::new(Mutex::new(())));

/// How an attempt sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// An attempt succeeded.
    Delivered {
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed.
    Exhausted,
    /// Shutdown was requested during a backoff pause.
    Interrupted,
}

/// Runs attempt sequences under a shared lock.
#[derive(Debug, Clone)]
pub struct RetryRunner {
    attempts: u32,
    backoff: Duration,
    lock: Arc<Mutex<()>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Default for RetryRunner {
    fn default() -> Self {
        Self::with_lock(Arc::clone(&DELIVERY_LOCK))
    }
}

impl RetryRunner {
    /// Creates a runner on the process-wide delivery lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner on a caller-provided lock.
    #[must_use]
    pub const fn with_lock(lock: Arc<Mutex<()>>) -> Self {
        Self {
            attempts: ATTEMPTS,
            backoff: BACKOFF,
            lock,
            shutdown: None,
        }
    }

    /// Ends the sequence early when `shutdown` turns true during a pause.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Attempt budget.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Delivers `task` through `mailer`.
    pub async fn deliver<M: Mailer>(&self, mailer: &M, task: &DeliveryTask) -> RetryOutcome {
        self.run(&task.to_string(), |_| mailer.send(task)).await
    }

    /// Runs `attempt` until it succeeds, the budget is spent, or shutdown
    /// interrupts a pause. The attempt receives its 1-based number.
    pub async fn run<F, Fut, E>(&self, label: &str, mut attempt: F) -> RetryOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let _guard = self.lock.lock().await;
        let mut shutdown = self.shutdown.clone();

        if shutdown.as_ref().is_some_and(|rx| *rx.borrow()) {
            warn!("Shutting down, not sending {label}");
            return RetryOutcome::Interrupted;
        }

        for n in 1..=self.attempts {
            info!(attempt = n, of = self.attempts, "Sending {label}");

            match attempt(n).await {
                Ok(()) => {
                    info!(attempt = n, "Delivered {label}");
                    return RetryOutcome::Delivered { attempts: n };
                }
                Err(e) => error!(attempt = n, "Attempt failed: {e}"),
            }

            if n < self.attempts && !self.pause(shutdown.as_mut()).await {
                warn!(attempt = n, "Interrupted while waiting to retry {label}");
                return RetryOutcome::Interrupted;
            }
        }

        error!(attempts = self.attempts, "Giving up on {label}");
        RetryOutcome::Exhausted
    }

    /// Sleeps for the backoff. Returns false if shutdown came first.
    async fn pause(&self, shutdown: Option<&mut watch::Receiver<bool>>) -> bool {
        let Some(shutdown) = shutdown else {
            tokio::time::sleep(self.backoff).await;
            return true;
        };
        if *shutdown.borrow() {
            return false;
        }

        tokio::select! {
            () = tokio::time::sleep(self.backoff) => true,
            Ok(_) = shutdown.wait_for(|stop| *stop) => false,
        }
    }
}
