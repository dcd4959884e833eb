use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(GroupId);

pub const SYSTEM_MARKER: &str = "【系统】";
pub const EVENT_MARKER: &str = "【剧情】";
pub const COMBAT_MARKER: &str = "【战斗】";
pub const REWARD_MARKER: &str = "【奖励】";
pub const TIP_MARKER: &str = "[提示]";
pub const WARNING_MARKER: &str = "【警告】";
pub const PLAYER_MARKER: &str = "➤";

/// Display category of a narrative line, derived from its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    System,
    Event,
    Combat,
    Reward,
    Tip,
    Warning,
    Player,
    General,
}

const PREFIX_TABLE: [(&str, Category); 7] = [
    (SYSTEM_MARKER, Category::System),
    (EVENT_MARKER, Category::Event),
    (COMBAT_MARKER, Category::Combat),
    (REWARD_MARKER, Category::Reward),
    (TIP_MARKER, Category::Tip),
    (WARNING_MARKER, Category::Warning),
    (PLAYER_MARKER, Category::Player),
];

/// First matching prefix wins; anything else is `General`.
pub fn classify(text: &str) -> Category {
    PREFIX_TABLE
        .iter()
        .find(|(marker, _)| text.starts_with(marker))
        .map(|(_, category)| *category)
        .unwrap_or(Category::General)
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::System,
        Category::Event,
        Category::Combat,
        Category::Reward,
        Category::Tip,
        Category::Warning,
        Category::Player,
        Category::General,
    ];

    pub fn marker(self) -> Option<&'static str> {
        PREFIX_TABLE
            .iter()
            .find(|(_, category)| *category == self)
            .map(|(marker, _)| *marker)
    }

    /// Header used for groups rebuilt from the bulk transcript.
    pub fn group_title(self) -> Option<&'static str> {
        match self {
            Category::System => Some("System"),
            Category::Event => Some("Story"),
            Category::Combat => Some("Combat Log"),
            Category::Reward => Some("Rewards"),
            Category::Tip => Some("Hints"),
            Category::Warning => Some("Warnings"),
            Category::Player => Some("Player Actions"),
            Category::General => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::System => "system",
            Category::Event => "event",
            Category::Combat => "combat",
            Category::Reward => "reward",
            Category::Tip => "tip",
            Category::Warning => "warning",
            Category::Player => "player",
            Category::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Onboarding progress. Steps only ever move forward by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorialStep {
    #[default]
    Welcome,
    ChoosePath,
    CheckStatus,
    Train,
    Explore,
    Complete,
}

impl TutorialStep {
    pub fn index(self) -> u8 {
        match self {
            TutorialStep::Welcome => 0,
            TutorialStep::ChoosePath => 1,
            TutorialStep::CheckStatus => 2,
            TutorialStep::Train => 3,
            TutorialStep::Explore => 4,
            TutorialStep::Complete => 5,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(TutorialStep::Welcome),
            1 => Some(TutorialStep::ChoosePath),
            2 => Some(TutorialStep::CheckStatus),
            3 => Some(TutorialStep::Train),
            4 => Some(TutorialStep::Explore),
            5 => Some(TutorialStep::Complete),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub title: String,
    pub description: String,
}

impl Achievement {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
