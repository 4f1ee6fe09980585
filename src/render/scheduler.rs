use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Debounces bursts of updates into a single handler call.
///
/// Every [`schedule`](RedrawScheduler::schedule) replaces the pending value
/// and restarts the quiet period; the handler runs with the last value once
/// no update arrived for `quiet_period`. Dropping the scheduler discards any
/// pending value and stops the task.
pub struct RedrawScheduler<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> RedrawScheduler<T> {
    pub fn spawn<F, Fut>(quiet_period: Duration, mut handler: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                let mut pending = first;
                let mut coalesced = 0usize;

                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => {
                                pending = value;
                                coalesced += 1;
                                trace!("Redraw request coalesced");
                            }
                            None => return,
                        },
                        _ = tokio::time::sleep(quiet_period) => break,
                    }
                }

                debug!(coalesced, "Quiet period elapsed, running redraw");
                handler(pending).await;
            }
        });

        Self { tx, task }
    }

    /// Queue a value. Returns `false` if the scheduler task is gone.
    pub fn schedule(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

impl<T> Drop for RedrawScheduler<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
