use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context};
use tracing::warn;
use url::Url;

use crate::{
    aggregator::AggregatorTimings, ambient, orchestrator::OrchestratorTimings, store,
};

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub interaction_grace_ms: u64,
    pub group_idle_ms: u64,
    pub scroll_delay_ms: u64,
    pub action_finish_ms: u64,
    pub achievement_total: u32,
    pub ambient_interval_ms: u64,
    pub ambient_chance: f64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5001".into(),
            poll_interval_ms: 5000,
            interaction_grace_ms: 1000,
            group_idle_ms: 3000,
            scroll_delay_ms: 100,
            action_finish_ms: 100,
            achievement_total: store::DEFAULT_ACHIEVEMENT_TOTAL,
            ambient_interval_ms: 60_000,
            ambient_chance: ambient::DEFAULT_AMBIENT_CHANCE,
        }
    }
}

/// Keys accepted in the config file. Each also reads from `APP__<KEY>`.
const KEYS: [&str; 9] = [
    "server_url",
    "poll_interval_ms",
    "interaction_grace_ms",
    "group_idle_ms",
    "scroll_delay_ms",
    "action_finish_ms",
    "achievement_total",
    "ambient_interval_ms",
    "ambient_chance",
];

impl ClientSettings {
    /// Applies one textual override. Unknown keys and unparsable values are
    /// logged and ignored.
    pub fn apply(&mut self, key: &str, value: &str) {
        let value = value.trim();
        let applied = match key {
            "server_url" => {
                self.server_url = value.to_string();
                true
            }
            "poll_interval_ms" => set_parsed(&mut self.poll_interval_ms, value),
            "interaction_grace_ms" => set_parsed(&mut self.interaction_grace_ms, value),
            "group_idle_ms" => set_parsed(&mut self.group_idle_ms, value),
            "scroll_delay_ms" => set_parsed(&mut self.scroll_delay_ms, value),
            "action_finish_ms" => set_parsed(&mut self.action_finish_ms, value),
            "achievement_total" => set_parsed(&mut self.achievement_total, value),
            "ambient_interval_ms" => set_parsed(&mut self.ambient_interval_ms, value),
            "ambient_chance" => set_parsed(&mut self.ambient_chance, value),
            _ => false,
        };
        if !applied {
            warn!(key, value, "ignoring client setting");
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.server_url)
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        ensure!(
            matches!(url.scheme(), "http" | "https"),
            "server url must be http or https, got '{}'",
            url.scheme()
        );
        ensure!(self.poll_interval_ms > 0, "poll interval must be positive");
        ensure!(
            self.ambient_interval_ms > 0,
            "ambient interval must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&self.ambient_chance),
            "ambient chance must be within [0, 1], got {}",
            self.ambient_chance
        );
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ambient_interval(&self) -> Duration {
        Duration::from_millis(self.ambient_interval_ms)
    }

    pub fn aggregator_timings(&self) -> AggregatorTimings {
        AggregatorTimings {
            idle_timeout: Duration::from_millis(self.group_idle_ms),
            scroll_delay: Duration::from_millis(self.scroll_delay_ms),
        }
    }

    pub fn orchestrator_timings(&self) -> OrchestratorTimings {
        OrchestratorTimings {
            action_group_finish: Duration::from_millis(self.action_finish_ms),
            interaction_grace: Duration::from_millis(self.interaction_grace_ms),
            ..OrchestratorTimings::default()
        }
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

/// Defaults, then `client.toml` in the working directory, then the process
/// environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<toml::Table>(&raw) {
            Ok(file_cfg) => {
                for (key, value) in file_cfg {
                    let value = match value {
                        toml::Value::String(text) => text,
                        other => other.to_string(),
                    };
                    settings.apply(&key, &value);
                }
            }
            Err(error) => warn!(path = %path.display(), %error, "unreadable client config"),
        }
    }

    if let Some(v) = env("GAME_SERVER_URL") {
        settings.server_url = v;
    }
    for key in KEYS {
        if let Some(v) = env(&format!("APP__{}", key.to_uppercase())) {
            settings.apply(key, &v);
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
