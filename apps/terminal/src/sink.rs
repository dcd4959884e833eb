use std::{
    io::Write,
    mem,
    sync::{Mutex, PoisonError},
};

use session_core::{
    status::{format_bonus, PlayerStatus},
    tutorial::PathChoice,
    DisplaySink, LogEntry, LogGroup,
};
use shared::domain::{Achievement, Category, GroupId};

/// Prints the transcript as plain lines. Every reconciliation replays the
/// whole backend transcript, so only lines past the previous replay's common
/// prefix are printed.
pub struct TerminalSink<W: Write + Send> {
    inner: Mutex<Inner<W>>,
}

struct Inner<W> {
    out: W,
    previous: Vec<String>,
    current: Vec<String>,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                out,
                previous: Vec::new(),
                current: Vec::new(),
            }),
        }
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner<W>) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }
}

fn label(category: Category) -> &'static str {
    match category {
        Category::System => "system",
        Category::Event => "story",
        Category::Combat => "combat",
        Category::Reward => "reward",
        Category::Tip => "hint",
        Category::Warning => "warning",
        Category::Player => "you",
        Category::General => "",
    }
}

fn render(entry: &LogEntry) -> String {
    match label(entry.category) {
        "" => format!("  {}", entry.text),
        tag => format!("  [{tag}] {}", entry.text),
    }
}

impl<W: Write + Send> DisplaySink for TerminalSink<W> {
    fn append_group(&self, group: &LogGroup) {
        self.with_inner(|inner| {
            if group.entries.is_empty() {
                if let Some(title) = &group.title {
                    let _ = writeln!(inner.out, "-- {title} --");
                }
                return;
            }

            let mut header_written = false;
            for entry in &group.entries {
                let seen = inner.previous.get(inner.current.len()) == Some(&entry.text);
                inner.current.push(entry.text.clone());
                if seen || entry.category == Category::Player {
                    continue;
                }
                if !header_written {
                    if let Some(title) = &group.title {
                        let _ = writeln!(inner.out, "-- {title} --");
                    }
                    header_written = true;
                }
                let _ = writeln!(inner.out, "{}", render(entry));
            }
        });
    }

    fn clear(&self) {
        self.with_inner(|inner| {
            inner.previous = mem::take(&mut inner.current);
        });
    }

    fn scroll_to_end(&self) {
        self.with_inner(|inner| {
            let _ = inner.out.flush();
        });
    }

    fn append_entry(&self, _group: GroupId, entry: &LogEntry) {
        if entry.category == Category::Player {
            return;
        }
        self.with_inner(|inner| {
            let _ = writeln!(inner.out, "{}", render(entry));
        });
    }

    fn announce_achievement(&self, achievement: &Achievement, unlocked: u32, total: u32) {
        self.with_inner(|inner| {
            let _ = writeln!(
                inner.out,
                "** Achievement unlocked: {} ({}) [{unlocked}/{total}]",
                achievement.title, achievement.description
            );
        });
    }

    fn present_choices(&self, prompt: &str, choices: &[PathChoice]) {
        self.with_inner(|inner| {
            let _ = writeln!(inner.out, "{prompt}");
            for (index, choice) in choices.iter().enumerate() {
                let _ = writeln!(
                    inner.out,
                    "  !{} {} ({})",
                    index + 1,
                    choice.label,
                    choice.summary
                );
            }
        });
    }
}

pub fn format_status(status: &PlayerStatus) -> String {
    format!(
        "{name} | {realm}\n\
         cultivation {cult:.0}/{cult_max:.0}\n\
         health {hp:.0}/{hp_max:.0}  mana {mp:.0}/{mp_max:.0}  stamina {sp:.0}/{sp_max:.0}\n\
         attack {atk}{atk_bonus}  defense {def}{def_bonus}\n\
         {location} | gold {gold}",
        name = status.name,
        realm = status.realm,
        cult = status.cultivation.current,
        cult_max = status.cultivation.max,
        hp = status.health.current,
        hp_max = status.health.max,
        mp = status.mana.current,
        mp_max = status.mana.max,
        sp = status.stamina.current,
        sp_max = status.stamina.max,
        atk = status.attack,
        atk_bonus = format_bonus(status.attack_bonus),
        def = status.defense,
        def_bonus = format_bonus(status.defense_bonus),
        location = status.location,
        gold = status.gold,
    )
}

#[cfg(test)]
#[path = "tests/sink_tests.rs"]
mod tests;
