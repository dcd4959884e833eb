//! Groups narrative lines into display batches.
//!
//! Two sources feed the transcript: entries added one at a time while a
//! command is in flight, and the full backend transcript which replaces
//! everything on each reconciliation. At most one group is open at a time;
//! an open group closes on an explicit finish, when a newer group starts, or
//! when its auto-finish timer fires.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use shared::domain::{classify, Category, GroupId};
use tracing::debug;

use crate::{
    display::DisplaySink,
    scheduler::{ScheduledTask, Scheduler},
};

pub const MAX_BULK_GROUP_SIZE: usize = 5;
pub const DEFAULT_GROUP_IDLE_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_SCROLL_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub category: Category,
    pub text: String,
}

impl LogEntry {
    pub fn new(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    pub fn classified(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            category: classify(&text),
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogGroup {
    pub id: GroupId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, Copy)]
pub struct AggregatorTimings {
    pub idle_timeout: Duration,
    pub scroll_delay: Duration,
}

impl Default for AggregatorTimings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_GROUP_IDLE_TIMEOUT,
            scroll_delay: DEFAULT_SCROLL_DELAY,
        }
    }
}

#[derive(Default)]
struct Transcript {
    groups: Vec<LogGroup>,
    open: Option<GroupId>,
    auto_finish: Option<ScheduledTask>,
    next_id: u64,
}

pub struct LogAggregator {
    sink: Arc<dyn DisplaySink>,
    scheduler: Scheduler,
    timings: AggregatorTimings,
    transcript: Mutex<Transcript>,
}

/// Splits classified lines into contiguous same-category runs of at most
/// [`MAX_BULK_GROUP_SIZE`] entries.
pub fn group_runs<S: AsRef<str>>(lines: &[S]) -> Vec<(Category, Vec<LogEntry>)> {
    let mut runs: Vec<(Category, Vec<LogEntry>)> = Vec::new();
    for line in lines {
        let entry = LogEntry::classified(line.as_ref());
        match runs.last_mut() {
            Some((category, entries))
                if *category == entry.category && entries.len() < MAX_BULK_GROUP_SIZE =>
            {
                entries.push(entry);
            }
            _ => runs.push((entry.category, vec![entry])),
        }
    }
    runs
}

impl LogAggregator {
    pub fn new(
        sink: Arc<dyn DisplaySink>,
        scheduler: Scheduler,
        timings: AggregatorTimings,
    ) -> Arc<Self> {
        Arc::new(Self {
            sink,
            scheduler,
            timings,
            transcript: Mutex::new(Transcript::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start_group(self: &Arc<Self>, title: Option<&str>) -> GroupId {
        let mut transcript = self.lock();
        self.open_group_locked(&mut transcript, title)
    }

    pub fn add_entry(self: &Arc<Self>, category: Category, text: impl Into<String>) -> GroupId {
        let entry = LogEntry::new(category, text);
        let group_id = {
            let mut transcript = self.lock();
            let group_id = match transcript.open {
                Some(id) => id,
                None => self.open_group_locked(&mut transcript, None),
            };
            if let Some(group) = transcript
                .groups
                .last_mut()
                .filter(|group| group.id == group_id)
            {
                group.entries.push(entry.clone());
            }
            self.sink.append_entry(group_id, &entry);
            group_id
        };

        let sink = self.sink.clone();
        self.scheduler
            .schedule_fn(self.timings.scroll_delay, move || sink.scroll_to_end());
        group_id
    }

    pub fn finish_group(&self) {
        let mut transcript = self.lock();
        self.finish_locked(&mut transcript);
    }

    /// Finishes only if `group_id` is still the open group.
    pub fn finish_if_open(&self, group_id: GroupId) -> bool {
        let mut transcript = self.lock();
        if transcript.open != Some(group_id) {
            return false;
        }
        self.finish_locked(&mut transcript);
        true
    }

    pub fn post_group(self: &Arc<Self>, title: &str, entries: &[(Category, &str)]) -> GroupId {
        let group_id = self.start_group(Some(title));
        for (category, text) in entries {
            self.add_entry(*category, *text);
        }
        self.finish_if_open(group_id);
        group_id
    }

    pub fn rebuild_from_bulk<S: AsRef<str>>(&self, lines: &[S]) {
        let mut transcript = self.lock();
        self.finish_locked(&mut transcript);
        transcript.groups.clear();
        self.sink.clear();

        for (category, entries) in group_runs(lines) {
            transcript.next_id += 1;
            let group = LogGroup {
                id: GroupId(transcript.next_id),
                title: category.group_title().map(str::to_string),
                created_at: Utc::now(),
                entries,
            };
            self.sink.append_group(&group);
            transcript.groups.push(group);
        }
        debug!(
            lines = lines.len(),
            groups = transcript.groups.len(),
            "transcript rebuilt"
        );
        self.sink.scroll_to_end();
    }

    pub fn transcript(&self) -> Vec<LogGroup> {
        self.lock().groups.clone()
    }

    pub fn open_group(&self) -> Option<GroupId> {
        self.lock().open
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.lock()
            .groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .any(|entry| entry.text == text)
    }

    fn open_group_locked(
        self: &Arc<Self>,
        transcript: &mut Transcript,
        title: Option<&str>,
    ) -> GroupId {
        self.finish_locked(transcript);

        transcript.next_id += 1;
        let id = GroupId(transcript.next_id);
        let group = LogGroup {
            id,
            title: title.map(str::to_string),
            created_at: Utc::now(),
            entries: Vec::new(),
        };
        self.sink.append_group(&group);
        transcript.groups.push(group);
        transcript.open = Some(id);

        let aggregator = Arc::downgrade(self);
        transcript.auto_finish = Some(self.scheduler.schedule_fn(
            self.timings.idle_timeout,
            move || {
                if let Some(aggregator) = aggregator.upgrade() {
                    if aggregator.finish_if_open(id) {
                        debug!(group = id.0, "log group auto-finished");
                    }
                }
            },
        ));
        id
    }

    fn finish_locked(&self, transcript: &mut Transcript) {
        if let Some(timer) = transcript.auto_finish.take() {
            timer.cancel();
        }
        if let Some(id) = transcript.open.take() {
            self.sink.group_finished(id);
        }
    }
}

#[cfg(test)]
#[path = "tests/aggregator_tests.rs"]
mod tests;
