//! Shared fakes for the module tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::{Achievement, Category, GroupId, PLAYER_MARKER},
    protocol::{LogPayload, RefreshSignal, StatusPayload},
};

use crate::{
    aggregator::{LogEntry, LogGroup},
    display::DisplaySink,
    error::{RemoteError, RemoteOperation},
    remote::{CommandAck, GameBackend},
    tutorial::PathChoice,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Group {
        id: GroupId,
        title: Option<String>,
        entries: usize,
    },
    Entry {
        group: GroupId,
        category: Category,
        text: String,
    },
    Finished(GroupId),
    Clear,
    Scroll,
    Achievement {
        title: String,
        unlocked: u32,
        total: u32,
    },
    Choices(usize),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().expect("sink lock").clone()
    }

    pub fn finished_count(&self, id: GroupId) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == SinkEvent::Finished(id))
            .count()
    }

    pub fn entries(&self) -> Vec<(Category, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Entry { category, text, .. } => Some((category, text)),
                _ => None,
            })
            .collect()
    }

    pub fn achievements(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Achievement { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().expect("sink lock").push(event);
    }
}

impl DisplaySink for RecordingSink {
    fn append_group(&self, group: &LogGroup) {
        self.push(SinkEvent::Group {
            id: group.id,
            title: group.title.clone(),
            entries: group.entries.len(),
        });
    }

    fn clear(&self) {
        self.push(SinkEvent::Clear);
    }

    fn scroll_to_end(&self) {
        self.push(SinkEvent::Scroll);
    }

    fn append_entry(&self, group: GroupId, entry: &LogEntry) {
        self.push(SinkEvent::Entry {
            group,
            category: entry.category,
            text: entry.text.clone(),
        });
    }

    fn group_finished(&self, group: GroupId) {
        self.push(SinkEvent::Finished(group));
    }

    fn announce_achievement(&self, achievement: &Achievement, unlocked: u32, total: u32) {
        self.push(SinkEvent::Achievement {
            title: achievement.title.clone(),
            unlocked,
            total,
        });
    }

    fn present_choices(&self, _prompt: &str, choices: &[PathChoice]) {
        self.push(SinkEvent::Choices(choices.len()));
    }
}

/// In-memory backend that echoes commands into its transcript.
#[derive(Default)]
pub struct FakeBackend {
    pub logs: Mutex<Vec<String>>,
    pub status: Mutex<StatusPayload>,
    pub signal: Mutex<Option<RefreshSignal>>,
    pub fail_dispatch: Mutex<Option<String>>,
    pub fail_log: Mutex<bool>,
    pub dispatched: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<RemoteOperation>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_health(current: f64, max: f64) -> Arc<Self> {
        let backend = Self::default();
        *backend.status.lock().expect("status lock") = serde_json::from_value(json!({
            "player": {"name": "Lin", "attributes": {"current_health": current, "max_health": max}},
            "location": "Qingyun Mountain",
            "gold": 5
        }))
        .expect("status payload");
        Arc::new(backend)
    }

    pub fn set_signal(&self, signal: Option<RefreshSignal>) {
        *self.signal.lock().expect("signal lock") = signal;
    }

    pub fn calls(&self) -> Vec<RemoteOperation> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, operation: RemoteOperation) -> usize {
        self.calls().iter().filter(|op| **op == operation).count()
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched.lock().expect("dispatch lock").clone()
    }

    fn record(&self, operation: RemoteOperation) {
        self.calls.lock().expect("calls lock").push(operation);
    }
}

#[async_trait]
impl GameBackend for FakeBackend {
    async fn dispatch_command(&self, command: &str) -> Result<CommandAck, RemoteError> {
        self.record(RemoteOperation::DispatchCommand);
        if let Some(message) = self.fail_dispatch.lock().expect("fail lock").clone() {
            return Err(RemoteError::other(RemoteOperation::DispatchCommand, message));
        }
        self.dispatched
            .lock()
            .expect("dispatch lock")
            .push(command.to_string());
        self.logs
            .lock()
            .expect("logs lock")
            .push(format!("{PLAYER_MARKER} {command}"));
        Ok(CommandAck::default())
    }

    async fn fetch_status(&self) -> Result<StatusPayload, RemoteError> {
        self.record(RemoteOperation::FetchStatus);
        Ok(self.status.lock().expect("status lock").clone())
    }

    async fn fetch_log(&self) -> Result<LogPayload, RemoteError> {
        self.record(RemoteOperation::FetchLog);
        if *self.fail_log.lock().expect("fail lock") {
            return Err(RemoteError::other(RemoteOperation::FetchLog, "log unavailable"));
        }
        Ok(LogPayload {
            logs: self.logs.lock().expect("logs lock").clone(),
        })
    }

    async fn fetch_refresh_signal(&self) -> Result<RefreshSignal, RemoteError> {
        self.record(RemoteOperation::FetchRefreshSignal);
        self.signal
            .lock()
            .expect("signal lock")
            .ok_or_else(|| RemoteError::other(RemoteOperation::FetchRefreshSignal, "offline"))
    }
}

/// Lets paused-clock timers that are due by now run to completion.
pub async fn settle(millis: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
