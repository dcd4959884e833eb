use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

/// Body of `GET /status`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub player: Option<PlayerPayload>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub gold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: PlayerAttributes,
    #[serde(default)]
    pub extra_data: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    #[serde(default)]
    pub realm_name: Option<String>,
    #[serde(default)]
    pub cultivation_level: Option<f64>,
    #[serde(default)]
    pub max_cultivation: Option<f64>,
    #[serde(default)]
    pub current_health: Option<f64>,
    #[serde(default)]
    pub max_health: Option<f64>,
    #[serde(default)]
    pub current_mana: Option<f64>,
    #[serde(default)]
    pub max_mana: Option<f64>,
    #[serde(default)]
    pub current_stamina: Option<f64>,
    #[serde(default)]
    pub max_stamina: Option<f64>,
    #[serde(default)]
    pub attack_power: Option<f64>,
    #[serde(default)]
    pub defense: Option<f64>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Body of `GET /log`: the full transcript, oldest line first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPayload {
    #[serde(default)]
    pub logs: Vec<String>,
}

/// Body of `GET /need_refresh`.
///
/// Only `refresh` and `last_update` are retained, so equality ignores any
/// other field the backend attaches (version strings, counters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshSignal {
    pub refresh: bool,
    #[serde(default)]
    pub last_update: Option<f64>,
}

impl RefreshSignal {
    /// True when the signal asks for a refresh newer than `last_seen`.
    pub fn is_newer_than(&self, last_seen: f64) -> bool {
        self.refresh && self.last_update.is_some_and(|ts| ts > last_seen)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
