//! Scripted onboarding: which step a trigger advances, after what delay,
//! and what gets revealed when it does.

use std::time::Duration;

use shared::domain::{Achievement, Category, TutorialStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathChoice {
    pub label: &'static str,
    pub summary: &'static str,
}

pub const CHOICE_PROMPT: &str =
    "The daoist counts on his fingers: \"Your fate is unusual. Three roads lie open to you. Choose.\"";

pub const PATH_CHOICES: [PathChoice; 3] = [
    PathChoice {
        label: "Path of the Sword",
        summary: "greater attack, weaker defense",
    },
    PathChoice {
        label: "Path of the Body",
        summary: "formidable defense, slower movement",
    },
    PathChoice {
        label: "Path of the Arcane",
        summary: "abundant spiritual power, frail constitution",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialTrigger<'a> {
    SessionStart,
    PathChosen,
    Command(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    pub title: &'static str,
    pub entries: &'static [(Category, &'static str)],
    pub present_choices: bool,
    pub achievement: Option<(&'static str, &'static str)>,
}

impl Reveal {
    pub fn achievement(&self) -> Option<Achievement> {
        self.achievement
            .map(|(title, description)| Achievement::new(title, description))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TutorialStep,
    pub to: TutorialStep,
    pub delay: Duration,
    pub reveal: &'static Reveal,
}

const STATUS_ALIASES: &[&str] = &["status", "s", "状态"];
const TRAIN_ALIASES: &[&str] = &["train", "cultivate", "c", "修炼"];
const EXPLORE_ALIASES: &[&str] = &["explore", "e", "探索"];

static WELCOME: Reveal = Reveal {
    title: "New Player Guide",
    entries: &[
        (
            Category::System,
            "【系统】Welcome to the world of cultivation. You begin as a mortal stepping onto the immortal path.",
        ),
        (
            Category::Event,
            "【剧情】You were born in a quiet village below Qingyun Mountain. In your sixteenth year a wandering daoist noticed your aptitude and handed you a scroll of the Basic Breathing Art. Your journey begins.",
        ),
        (
            Category::Tip,
            "[提示] Commands such as \"train\", \"inventory\" and \"explore\" drive the game. Try \"status\" to look at your character.",
        ),
    ],
    present_choices: true,
    achievement: None,
};

static PATH_CHOSEN: Reveal = Reveal {
    title: "Tutorial",
    entries: &[(
        Category::Tip,
        "[提示] Well chosen. Now enter \"status\" to check your character.",
    )],
    present_choices: false,
    achievement: None,
};

static STATUS_CHECKED: Reveal = Reveal {
    title: "Tutorial",
    entries: &[(
        Category::Tip,
        "[提示] Good, you know where you stand. Now try \"train\" to raise your cultivation.",
    )],
    present_choices: false,
    achievement: None,
};

static TRAINED: Reveal = Reveal {
    title: "Tutorial",
    entries: &[(
        Category::Tip,
        "[提示] Training raises cultivation; once it peaks you can break through to the next realm. Next, \"explore\" your surroundings.",
    )],
    present_choices: false,
    achievement: None,
};

static EXPLORED: Reveal = Reveal {
    title: "Tutorial Complete",
    entries: &[
        (
            Category::Tip,
            "[提示] Exploring uncovers fortunes and events. You have mastered the basics; may your path be smooth!",
        ),
        (
            Category::Tip,
            "[提示] Use \"?\" followed by a few letters for command hints, and :up / :down to browse past commands.",
        ),
    ],
    present_choices: false,
    achievement: Some(("First Steps", "Complete the new player tutorial")),
};

fn matches_alias(command: &str, aliases: &[&str]) -> bool {
    let command = command.trim().to_lowercase();
    aliases.iter().any(|alias| *alias == command)
}

/// The transition `trigger` fires from `step`, if any. Out-of-order triggers
/// yield `None`.
pub fn transition_for(step: TutorialStep, trigger: TutorialTrigger<'_>) -> Option<Transition> {
    let (to, delay_ms, reveal) = match (step, trigger) {
        (TutorialStep::Welcome, TutorialTrigger::SessionStart) => {
            (TutorialStep::ChoosePath, 1000, &WELCOME)
        }
        (TutorialStep::ChoosePath, TutorialTrigger::PathChosen) => {
            (TutorialStep::CheckStatus, 1000, &PATH_CHOSEN)
        }
        (TutorialStep::CheckStatus, TutorialTrigger::Command(cmd))
            if matches_alias(cmd, STATUS_ALIASES) =>
        {
            (TutorialStep::Train, 1000, &STATUS_CHECKED)
        }
        (TutorialStep::Train, TutorialTrigger::Command(cmd))
            if matches_alias(cmd, TRAIN_ALIASES) =>
        {
            (TutorialStep::Explore, 3000, &TRAINED)
        }
        (TutorialStep::Explore, TutorialTrigger::Command(cmd))
            if matches_alias(cmd, EXPLORE_ALIASES) =>
        {
            (TutorialStep::Complete, 2000, &EXPLORED)
        }
        _ => return None,
    };
    Some(Transition {
        from: step,
        to,
        delay: Duration::from_millis(delay_ms),
        reveal,
    })
}

#[cfg(test)]
#[path = "tests/tutorial_tests.rs"]
mod tests;
