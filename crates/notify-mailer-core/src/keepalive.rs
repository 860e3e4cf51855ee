//! Keeps the device awake while a delivery runs.
//!
//! A [`KeepAwake`] implementation hands out a guard; the device may sleep
//! again once every guard is dropped. [`run_awake`] holds a guard for the
//! lifetime of a future, whether it completes, is cancelled or panics.

use std::future::Future;
use tracing::trace;

/// Source of keep-awake guards.
pub trait KeepAwake: Send + Sync {
    /// Guard that keeps the device awake until dropped.
    type Guard: Send;

    /// Acquires a guard labelled with `tag`.
    fn acquire(&self, tag: &str) -> Self::Guard;
}

/// Keeper for hosts without a sleep state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeepAwake;

impl KeepAwake for NoKeepAwake {
    type Guard = ();

    fn acquire(&self, tag: &str) -> Self::Guard {
        trace!(tag, "Keep-awake requested");
    }
}

/// Runs `work` while holding a guard from `keeper`.
pub async fn run_awake<K, F>(keeper: &K, tag: &str, work: F) -> F::Output
where
    K: KeepAwake + ?Sized,
    F: Future,
{
    let _guard = keeper.acquire(tag);
    work.await
}
