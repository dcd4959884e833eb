//! Delayed work on the tokio runtime with explicit cancellation handles.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// Handle to a pending delayed task. Dropping it does not cancel the task.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Self
    }

    /// Runs `task` once `delay` has elapsed. Must be called inside a tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task.await;
        });
        ScheduledTask { handle }
    }

    pub fn schedule_fn<F>(&self, delay: Duration, f: F) -> ScheduledTask
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule(delay, async move { f() })
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
