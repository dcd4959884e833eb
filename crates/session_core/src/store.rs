//! Client-only session state with synchronous change notification.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use shared::{
    domain::TutorialStep,
    protocol::{RefreshSignal, StatusPayload},
};

use crate::status::PlayerStatus;

pub const HISTORY_CAPACITY: usize = 50;
pub const DEFAULT_ACHIEVEMENT_TOTAL: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub is_new_player: bool,
    pub tutorial_step: TutorialStep,
    pub command_count: u64,
    pub command_history: VecDeque<String>,
    /// Always within `0..=command_history.len()`.
    pub history_cursor: usize,
    pub achievement_unlocked: u32,
    pub achievement_total: u32,
    /// Cooperative hint that a user command owns the transcript. Not a lock.
    pub is_user_interacting: bool,
    pub last_update_time: f64,
    pub last_known_refresh_signal: Option<RefreshSignal>,
    pub status: Option<PlayerStatus>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_new_player: true,
            tutorial_step: TutorialStep::Welcome,
            command_count: 0,
            command_history: VecDeque::with_capacity(HISTORY_CAPACITY),
            history_cursor: 0,
            achievement_unlocked: 0,
            achievement_total: DEFAULT_ACHIEVEMENT_TOTAL,
            is_user_interacting: false,
            last_update_time: 0.0,
            last_known_refresh_signal: None,
            status: None,
        }
    }
}

/// Shallow patch applied by [`SessionStore::set_state`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub is_new_player: Option<bool>,
    pub tutorial_step: Option<TutorialStep>,
    pub achievement_total: Option<u32>,
    pub is_user_interacting: Option<bool>,
    pub last_update_time: Option<f64>,
    pub last_known_refresh_signal: Option<RefreshSignal>,
}

impl SessionPatch {
    fn apply(self, state: &mut SessionState) {
        if let Some(v) = self.is_new_player {
            state.is_new_player = v;
        }
        if let Some(v) = self.tutorial_step {
            state.tutorial_step = v;
        }
        if let Some(v) = self.achievement_total {
            state.achievement_total = v;
            state.achievement_unlocked = state.achievement_unlocked.min(v);
        }
        if let Some(v) = self.is_user_interacting {
            state.is_user_interacting = v;
        }
        if let Some(v) = self.last_update_time {
            state.last_update_time = v;
        }
        if let Some(v) = self.last_known_refresh_signal {
            state.last_known_refresh_signal = Some(v);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Older,
    Newer,
}

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[derive(Default)]
pub struct SessionStore {
    state: Mutex<SessionState>,
    listeners: Mutex<Listeners>,
}

/// Returned by [`SessionStore::subscribe`]. Dropping it keeps the listener alive.
pub struct Subscription {
    id: u64,
    store: Weak<SessionStore>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(store) = self.store.upgrade() {
            lock(&store.listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_state(state: SessionState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            listeners: Mutex::new(Listeners::default()),
        })
    }

    pub fn state(&self) -> SessionState {
        lock(&self.state).clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&lock(&self.state))
    }

    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(self),
        }
    }

    pub fn set_state(&self, patch: SessionPatch) {
        self.update(|state| patch.apply(state));
    }

    /// Mutates under the lock, then notifies every listener in subscription
    /// order with the post-mutation snapshot. Listeners run outside the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = lock(&self.state);
            let result = f(&mut state);
            (result, state.clone())
        };
        let listeners: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
        result
    }

    /// Appends unless `command` repeats the newest entry, evicting the oldest
    /// past capacity. The cursor always lands one past the newest entry.
    pub fn push_command(&self, command: &str) {
        self.update(|state| {
            if state.command_history.back().map(String::as_str) != Some(command) {
                state.command_history.push_back(command.to_string());
                while state.command_history.len() > HISTORY_CAPACITY {
                    state.command_history.pop_front();
                }
            }
            state.history_cursor = state.command_history.len();
        });
    }

    pub fn navigate_history(&self, direction: HistoryDirection) -> Option<String> {
        self.update(|state| {
            let len = state.command_history.len();
            match direction {
                HistoryDirection::Older => {
                    if state.history_cursor == 0 {
                        return None;
                    }
                    state.history_cursor -= 1;
                    state.command_history.get(state.history_cursor).cloned()
                }
                HistoryDirection::Newer => {
                    if state.history_cursor + 1 < len {
                        state.history_cursor += 1;
                        state.command_history.get(state.history_cursor).cloned()
                    } else {
                        state.history_cursor = len;
                        Some(String::new())
                    }
                }
            }
        })
    }

    pub fn increment_command_count(&self) -> u64 {
        self.update(|state| {
            state.command_count += 1;
            state.command_count
        })
    }

    pub fn set_user_interacting(&self, interacting: bool) {
        self.set_state(SessionPatch {
            is_user_interacting: Some(interacting),
            ..SessionPatch::default()
        });
    }

    pub fn is_user_interacting(&self) -> bool {
        self.read(|state| state.is_user_interacting)
    }

    /// Moves the tutorial from `expected` to `next` only if it is still at `expected`.
    pub fn advance_tutorial(&self, expected: TutorialStep, next: TutorialStep) -> bool {
        self.update(|state| {
            if state.tutorial_step != expected {
                return false;
            }
            state.tutorial_step = next;
            if next == TutorialStep::Complete {
                state.is_new_player = false;
            }
            true
        })
    }

    pub fn unlock_achievement(&self) -> Option<u32> {
        self.update(|state| {
            if state.achievement_unlocked >= state.achievement_total {
                return None;
            }
            state.achievement_unlocked += 1;
            Some(state.achievement_unlocked)
        })
    }

    pub fn apply_status(&self, payload: &StatusPayload) -> Option<PlayerStatus> {
        let status = PlayerStatus::from_payload(payload)?;
        self.update(|state| state.status = Some(status.clone()));
        Some(status)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
