//! Worker: runs each submitted task on its own tokio task.

use super::dispatcher::TaskSink;
use crate::delivery::{DeliveryTask, Mailer, RetryOutcome, RetryRunner};
use crate::keepalive::{KeepAwake, NoKeepAwake, run_awake};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, warn};

const KEEP_AWAKE_TAG: &str = "notify-mailer:delivery";

/// Spawns a retry sequence per task and keeps track of them.
///
/// Submitting requires a running tokio runtime.
pub struct Worker<M, K = NoKeepAwake> {
    mailer: Arc<M>,
    runner: RetryRunner,
    keep_awake: Arc<K>,
    tasks: Mutex<JoinSet<RetryOutcome>>,
}

impl<M, K> Worker<M, K>
where
    M: Mailer + 'static,
    K: KeepAwake + 'static,
{
    /// Creates a worker.
    pub fn new(mailer: M, runner: RetryRunner, keep_awake: K) -> Self {
        Self {
            mailer: Arc::new(mailer),
            runner,
            keep_awake: Arc::new(keep_awake),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Number of deliveries not yet collected.
    pub fn in_flight(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Waits for every submitted delivery and returns the outcomes of
    /// those that finished normally.
    pub async fn drain(&self) -> Vec<RetryOutcome> {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(result) = tasks.join_next().await {
            if let Some(outcome) = collected(result) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}

impl<M, K> TaskSink for Worker<M, K>
where
    M: Mailer + 'static,
    K: KeepAwake + 'static,
{
    fn submit(&self, task: DeliveryTask) {
        let mailer = Arc::clone(&self.mailer);
        let keep_awake = Arc::clone(&self.keep_awake);
        let runner = self.runner.clone();

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(result) = tasks.try_join_next() {
            collected(result);
        }

        tasks.spawn(async move {
            run_awake(&*keep_awake, KEEP_AWAKE_TAG, runner.deliver(&*mailer, &task)).await
        });
    }
}

fn collected(result: Result<RetryOutcome, JoinError>) -> Option<RetryOutcome> {
    match result {
        Ok(outcome) => Some(outcome),
        Err(e) if e.is_panic() => {
            error!("Delivery task panicked");
            None
        }
        Err(_) => {
            warn!("Delivery task cancelled");
            None
        }
    }
}

impl<M, K> std::fmt::Debug for Worker<M, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}
