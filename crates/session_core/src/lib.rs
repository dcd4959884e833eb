use std::sync::Arc;

use anyhow::{Context, Result};
use shared::domain::TutorialStep;
use tokio::task::JoinHandle;
use tracing::info;

pub mod aggregator;
pub mod ambient;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod reconcile;
pub mod remote;
pub mod scheduler;
pub mod status;
pub mod store;
pub mod tutorial;

pub use aggregator::{LogAggregator, LogEntry, LogGroup};
pub use ambient::AmbientNarrator;
pub use config::{load_settings, ClientSettings};
pub use display::{DisplaySink, NullSink};
pub use error::{RemoteError, RemoteOperation};
pub use orchestrator::{CommandOrchestrator, SubmitOutcome};
pub use poller::{PollOutcome, PollerHandle, ReconciliationPoller};
pub use reconcile::Reconciler;
pub use remote::{GameBackend, HttpGameBackend};
pub use scheduler::{ScheduledTask, Scheduler};
pub use status::PlayerStatus;
pub use store::{HistoryDirection, SessionState, SessionStore};

/// One client session: store, transcript, orchestrator and the background
/// loops, wired against a single backend and display.
pub struct GameSession {
    store: Arc<SessionStore>,
    log: Arc<LogAggregator>,
    orchestrator: CommandOrchestrator,
    poller: ReconciliationPoller,
    narrator: Arc<AmbientNarrator>,
    settings: ClientSettings,
}

/// Background loops of a started session. Dropping it stops both loops.
pub struct RunningSession {
    poller: PollerHandle,
    ambient: AmbientTask,
    pub pending_tutorial: Option<TutorialStep>,
}

struct AmbientTask(JoinHandle<()>);

impl Drop for AmbientTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl GameSession {
    pub fn new(
        settings: ClientSettings,
        backend: Arc<dyn GameBackend>,
        sink: Arc<dyn DisplaySink>,
    ) -> Arc<Self> {
        let scheduler = Scheduler::new();
        let store = SessionStore::with_state(SessionState {
            achievement_total: settings.achievement_total,
            ..SessionState::default()
        });
        let log = LogAggregator::new(sink.clone(), scheduler, settings.aggregator_timings());
        let reconciler = Reconciler::new(backend, store.clone(), log.clone());
        let orchestrator = CommandOrchestrator::new(
            store.clone(),
            log.clone(),
            reconciler.clone(),
            sink,
            scheduler,
            settings.orchestrator_timings(),
        );
        let poller = ReconciliationPoller::new(store.clone(), reconciler, settings.poll_interval());
        let narrator = AmbientNarrator::new(store.clone(), log.clone(), settings.ambient_chance);

        Arc::new(Self {
            store,
            log,
            orchestrator,
            poller,
            narrator,
            settings,
        })
    }

    /// Validates `settings` and talks to the configured server over HTTP.
    pub fn connect(settings: ClientSettings, sink: Arc<dyn DisplaySink>) -> Result<Arc<Self>> {
        settings.validate().context("invalid client settings")?;
        let backend = HttpGameBackend::new(&settings.server_url)?;
        info!(server = %backend.base_url(), "game backend configured");
        Ok(Self::new(settings, Arc::new(backend), sink))
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn log(&self) -> &Arc<LogAggregator> {
        &self.log
    }

    pub fn orchestrator(&self) -> &CommandOrchestrator {
        &self.orchestrator
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Runs the first load, then starts polling and ambient narration.
    pub async fn start(&self) -> RunningSession {
        let pending_tutorial = self.orchestrator.begin_session().await;
        let poller = self.poller.clone().spawn();
        let ambient = AmbientTask(self.narrator.spawn(self.settings.ambient_interval()));
        RunningSession {
            poller,
            ambient,
            pending_tutorial,
        }
    }
}

impl RunningSession {
    pub fn check_now(&self) {
        self.poller.check_now();
    }

    pub async fn shutdown(self) {
        drop(self.ambient);
        self.poller.stop().await;
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod tests_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
