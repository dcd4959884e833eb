//! Rendering capability consumed by the aggregator and orchestrator.

use shared::domain::{Achievement, GroupId};

use crate::{
    aggregator::{LogEntry, LogGroup},
    tutorial::PathChoice,
};

/// Where narrative groups end up. Calls arrive while the transcript lock is
/// held, so implementations must not call back into the aggregator.
pub trait DisplaySink: Send + Sync {
    /// A new group became visible. Incremental groups arrive empty and are
    /// filled through [`DisplaySink::append_entry`]; bulk groups arrive full.
    fn append_group(&self, group: &LogGroup);
    fn clear(&self);
    fn scroll_to_end(&self);

    fn append_entry(&self, _group: GroupId, _entry: &LogEntry) {}

    fn group_finished(&self, _group: GroupId) {}

    fn announce_achievement(&self, _achievement: &Achievement, _unlocked: u32, _total: u32) {}

    fn present_choices(&self, _prompt: &str, _choices: &[PathChoice]) {}
}

/// Discards everything. Useful for headless sessions.
pub struct NullSink;

impl DisplaySink for NullSink {
    fn append_group(&self, _group: &LogGroup) {}

    fn clear(&self) {}

    fn scroll_to_end(&self) {}
}
