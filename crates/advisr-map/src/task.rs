//! Spawned work that can be cancelled, and a two-way race over it.

use std::future::Future;

use tokio::task::JoinHandle;

/// A spawned task that is aborted when cancelled or dropped.
pub struct CancellableTask<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> CancellableTask<T> {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }
}

impl<T> CancellableTask<T> {
    /// Abort the task. A completed task is unaffected.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the output. `None` when the task was cancelled or panicked.
    pub async fn join(mut self) -> Option<T> {
        (&mut self.handle).await.ok()
    }
}

impl<T> Drop for CancellableTask<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Which side of a [`race`] finished first. The inner value is `None` when
/// the winner was itself aborted or panicked.
#[derive(Debug, PartialEq, Eq)]
pub enum RaceOutcome<A, B> {
    Left(Option<A>),
    Right(Option<B>),
}

/// Wait for whichever task completes first and cancel the other.
///
/// When both are ready at the same poll, `left` wins.
pub async fn race<A, B>(
    mut left: CancellableTask<A>,
    mut right: CancellableTask<B>,
) -> RaceOutcome<A, B> {
    tokio::select! {
        biased;
        out = &mut left.handle => {
            right.cancel();
            RaceOutcome::Left(out.ok())
        }
        out = &mut right.handle => {
            left.cancel();
            RaceOutcome::Right(out.ok())
        }
    }
}
