//! Display-ready view of the `/status` payload.

use serde_json::Value;
use shared::protocol::StatusPayload;

const DEFAULT_NAME: &str = "Nameless Wanderer";
const DEFAULT_REALM: &str = "Qi Refining, Stage 1";
const DEFAULT_LOCATION: &str = "Qingyun City";
const DEFAULT_MAX_CULTIVATION: f64 = 100.0;
const DEFAULT_ATTACK: f64 = 10.0;
const DEFAULT_DEFENSE: f64 = 5.0;
pub const LOW_HEALTH_RATIO: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Meter {
    pub current: f64,
    pub max: f64,
}

impl Meter {
    /// Current is clamped into `[0, max]`; a missing max counts as zero.
    fn clamped(current: Option<f64>, max: Option<f64>) -> Self {
        let max = max.unwrap_or(0.0);
        let current = current.unwrap_or(0.0).min(max).max(0.0);
        Self { current, max }
    }

    pub fn ratio(&self) -> Option<f64> {
        (self.max > 0.0).then(|| self.current / self.max)
    }

    pub fn percent(&self) -> f64 {
        self.ratio().map(|r| (r * 100.0).clamp(0.0, 100.0)).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub name: String,
    pub realm: String,
    pub cultivation: Meter,
    pub health: Meter,
    pub mana: Meter,
    pub stamina: Meter,
    pub attack: f64,
    pub defense: f64,
    pub attack_bonus: f64,
    pub defense_bonus: f64,
    pub location: String,
    pub gold: f64,
}

impl PlayerStatus {
    /// `None` when the payload carries no player section.
    pub fn from_payload(payload: &StatusPayload) -> Option<Self> {
        let player = payload.player.as_ref()?;
        let attrs = &player.attributes;
        let effects = player
            .extra_data
            .as_ref()
            .and_then(|extra| extra.get("destiny"))
            .and_then(|destiny| destiny.get("effects"));
        let bonus = |key: &str| {
            effects
                .and_then(|e| e.get(key))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };

        Some(Self {
            name: non_empty(player.name.as_deref()).unwrap_or(DEFAULT_NAME).to_string(),
            realm: non_empty(attrs.realm_name.as_deref())
                .unwrap_or(DEFAULT_REALM)
                .to_string(),
            cultivation: Meter {
                current: attrs.cultivation_level.unwrap_or(0.0),
                max: attrs
                    .max_cultivation
                    .filter(|max| *max != 0.0)
                    .unwrap_or(DEFAULT_MAX_CULTIVATION),
            },
            health: Meter::clamped(attrs.current_health, attrs.max_health),
            mana: Meter::clamped(attrs.current_mana, attrs.max_mana),
            stamina: Meter::clamped(attrs.current_stamina, attrs.max_stamina),
            attack: attrs
                .attack_power
                .filter(|v| *v != 0.0)
                .unwrap_or(DEFAULT_ATTACK)
                .floor(),
            defense: attrs
                .defense
                .filter(|v| *v != 0.0)
                .unwrap_or(DEFAULT_DEFENSE)
                .floor(),
            attack_bonus: bonus("attack"),
            defense_bonus: bonus("defense"),
            location: non_empty(payload.location_name.as_deref())
                .or_else(|| non_empty(payload.location.as_deref()))
                .unwrap_or(DEFAULT_LOCATION)
                .to_string(),
            gold: payload.gold.unwrap_or(0.0),
        })
    }

    pub fn is_health_critical(&self) -> bool {
        self.health
            .ratio()
            .is_some_and(|ratio| ratio < LOW_HEALTH_RATIO)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Signed bonus label, empty when there is no bonus.
pub fn format_bonus(bonus: f64) -> String {
    if bonus == 0.0 {
        String::new()
    } else if bonus > 0.0 {
        format!("(+{bonus})")
    } else {
        format!("({bonus})")
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
