//! Background reconciliation driven by the backend's refresh signal.
//!
//! The poller yields to the orchestrator through the store's
//! `is_user_interacting` hint. The hint is advisory: a tick that started just
//! before a command may still interleave with it.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{oneshot, Notify},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{reconcile::Reconciler, store::SessionStore};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    SkippedInteracting,
    /// The signal could not be fetched; retried on the next tick.
    NoSignal,
    Unchanged,
    /// A new signal that does not ask for a newer refresh than the last one applied.
    Stale,
    Refreshed,
    RefreshFailed,
}

#[derive(Clone)]
pub struct ReconciliationPoller {
    store: Arc<SessionStore>,
    reconciler: Reconciler,
    interval: Duration,
}

impl ReconciliationPoller {
    pub fn new(store: Arc<SessionStore>, reconciler: Reconciler, interval: Duration) -> Self {
        Self {
            store,
            reconciler,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn tick(&self) -> PollOutcome {
        if self.store.is_user_interacting() {
            debug!("poll skipped while a command is in flight");
            return PollOutcome::SkippedInteracting;
        }

        let signal = match self.reconciler.backend().fetch_refresh_signal().await {
            Ok(signal) => signal,
            Err(error) => {
                debug!(%error, "refresh signal unavailable");
                return PollOutcome::NoSignal;
            }
        };

        let (outcome, previous) = self.store.update(|state| {
            let previous = (state.last_known_refresh_signal, state.last_update_time);
            if state.last_known_refresh_signal == Some(signal) {
                return (PollOutcome::Unchanged, previous);
            }
            state.last_known_refresh_signal = Some(signal);
            let outcome = match signal.last_update {
                Some(timestamp) if signal.is_newer_than(state.last_update_time) => {
                    state.last_update_time = timestamp;
                    PollOutcome::Refreshed
                }
                _ => PollOutcome::Stale,
            };
            (outcome, previous)
        });
        if outcome != PollOutcome::Refreshed {
            return outcome;
        }

        match self.reconciler.refresh().await {
            Ok(()) => {
                info!(last_update = ?signal.last_update, "backend changes reconciled");
                PollOutcome::Refreshed
            }
            Err(error) => {
                warn!(operation = %error.operation, %error, "poll refresh failed");
                // Forget the signal so the next tick retries it.
                let (last_signal, last_update_time) = previous;
                self.store.update(|state| {
                    if state.last_known_refresh_signal == Some(signal) {
                        state.last_known_refresh_signal = last_signal;
                        state.last_update_time = last_update_time;
                    }
                });
                PollOutcome::RefreshFailed
            }
        }
    }

    /// Starts the loop. The first tick runs one full interval from now.
    pub fn spawn(self) -> PollerHandle {
        let wake = Arc::new(Notify::new());
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let notified = wake.clone();
        let task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {}
                    _ = notified.notified() => {}
                }
                let outcome = self.tick().await;
                debug!(?outcome, "poll tick");
            }
            debug!("poller stopped");
        });

        PollerHandle {
            wake,
            stop_tx: Some(stop_tx),
            task,
        }
    }
}

pub struct PollerHandle {
    wake: Arc<Notify>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Runs a tick now instead of waiting for the interval, e.g. when the
    /// client regains focus.
    pub fn check_now(&self) {
        self.wake.notify_one();
    }

    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Err(error) = (&mut self.task).await {
            if !error.is_cancelled() {
                warn!(%error, "poller task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
