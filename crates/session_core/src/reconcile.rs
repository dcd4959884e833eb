//! The refresh path shared by command submission and the poller.

use std::sync::Arc;

use shared::{domain::Category, protocol::StatusPayload};
use tracing::{debug, info};

use crate::{
    aggregator::LogAggregator, error::RemoteError, remote::GameBackend, store::SessionStore,
};

pub const LOW_HEALTH_WARNING: &str = "【警告】Your health is dangerously low. Recover soon!";

#[derive(Clone)]
pub struct Reconciler {
    backend: Arc<dyn GameBackend>,
    store: Arc<SessionStore>,
    log: Arc<LogAggregator>,
}

impl Reconciler {
    pub fn new(
        backend: Arc<dyn GameBackend>,
        store: Arc<SessionStore>,
        log: Arc<LogAggregator>,
    ) -> Self {
        Self {
            backend,
            store,
            log,
        }
    }

    pub fn backend(&self) -> &Arc<dyn GameBackend> {
        &self.backend
    }

    /// Fetches transcript and status concurrently; nothing is applied unless
    /// both succeed.
    pub async fn refresh(&self) -> Result<(), RemoteError> {
        let (log, status) =
            futures::try_join!(self.backend.fetch_log(), self.backend.fetch_status())?;
        self.log.rebuild_from_bulk(&log.logs);
        self.apply_status(&status);
        debug!(lines = log.logs.len(), "session reconciled");
        Ok(())
    }

    pub async fn refresh_status(&self) -> Result<(), RemoteError> {
        let status = self.backend.fetch_status().await?;
        self.apply_status(&status);
        Ok(())
    }

    fn apply_status(&self, payload: &StatusPayload) {
        let Some(status) = self.store.apply_status(payload) else {
            return;
        };
        if status.is_health_critical() && !self.log.contains_text(LOW_HEALTH_WARNING) {
            info!(
                current = status.health.current,
                max = status.health.max,
                "health below warning threshold"
            );
            self.log
                .post_group("System Warning", &[(Category::Warning, LOW_HEALTH_WARNING)]);
        }
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
