//! Occasional flavour lines for idle, established players.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use shared::domain::Category;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::debug;

use crate::{aggregator::LogAggregator, store::SessionStore};

pub const AMBIENT_GROUP_TITLE: &str = "Ambience";
pub const DEFAULT_AMBIENT_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_AMBIENT_CHANCE: f64 = 0.05;

pub const AMBIENT_LINES: [&str; 6] = [
    "【剧情】A mountain breeze drifts by, faintly scented with herbs.",
    "【剧情】The clear cry of a crane echoes from far away.",
    "【剧情】A streak of light crosses the sky; some cultivator riding a flying sword.",
    "【剧情】Night deepens and the river of stars glitters overhead.",
    "【剧情】The spiritual energy ripples strangely, as if a treasure were about to surface.",
    "【剧情】Bells toll from the distant peaks: some sect's evening lesson.",
];

pub struct AmbientNarrator {
    store: Arc<SessionStore>,
    log: Arc<LogAggregator>,
    chance: f64,
    rng: Mutex<StdRng>,
}

impl AmbientNarrator {
    pub fn new(store: Arc<SessionStore>, log: Arc<LogAggregator>, chance: f64) -> Arc<Self> {
        Self::with_rng(store, log, chance, StdRng::from_entropy())
    }

    pub fn with_rng(
        store: Arc<SessionStore>,
        log: Arc<LogAggregator>,
        chance: f64,
        rng: StdRng,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            log,
            chance: chance.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        })
    }

    /// Rolls once; returns the line posted, if any.
    pub fn tick(self: &Arc<Self>) -> Option<&'static str> {
        let eligible = self
            .store
            .read(|state| !state.is_new_player && !state.is_user_interacting);
        if !eligible {
            return None;
        }

        let line = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            if !rng.gen_bool(self.chance) {
                return None;
            }
            *AMBIENT_LINES.choose(&mut *rng)?
        };
        self.log
            .post_group(AMBIENT_GROUP_TITLE, &[(Category::Event, line)]);
        debug!(line, "ambient narration");
        Some(line)
    }

    pub fn spawn(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let narrator = self.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                narrator.tick();
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/ambient_tests.rs"]
mod tests;
