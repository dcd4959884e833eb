//! Turns user input into backend calls and paces the onboarding script.

use std::{sync::Arc, time::Duration};

use shared::domain::{Category, GroupId, TutorialStep, PLAYER_MARKER};
use tracing::{debug, info, warn};

use crate::{
    aggregator::LogAggregator,
    display::DisplaySink,
    error::RemoteError,
    reconcile::Reconciler,
    scheduler::Scheduler,
    store::SessionStore,
    tutorial::{transition_for, Transition, TutorialTrigger, CHOICE_PROMPT, PATH_CHOICES},
};

pub const ACTION_GROUP_TITLE: &str = "Player Action";
pub const CHOICE_GROUP_TITLE: &str = "Destiny Choice";
pub const ERROR_GROUP_TITLE: &str = "System Error";
pub const COMMAND_FAILED_TEXT: &str = "【系统】The command failed. Please try again later.";

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorTimings {
    pub action_group_finish: Duration,
    pub interaction_grace: Duration,
    pub returning_player_refresh: Duration,
}

impl Default for OrchestratorTimings {
    fn default() -> Self {
        Self {
            action_group_finish: Duration::from_millis(100),
            interaction_grace: Duration::from_millis(1000),
            returning_player_refresh: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored,
    /// Dispatched and reconciled. `tutorial` names the step a pending reveal
    /// will move to.
    Completed { tutorial: Option<TutorialStep> },
    Failed { reason: String },
}

#[derive(Clone)]
pub struct CommandOrchestrator {
    store: Arc<SessionStore>,
    log: Arc<LogAggregator>,
    reconciler: Reconciler,
    sink: Arc<dyn DisplaySink>,
    scheduler: Scheduler,
    timings: OrchestratorTimings,
}

impl CommandOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        log: Arc<LogAggregator>,
        reconciler: Reconciler,
        sink: Arc<dyn DisplaySink>,
        scheduler: Scheduler,
        timings: OrchestratorTimings,
    ) -> Self {
        Self {
            store,
            log,
            reconciler,
            sink,
            scheduler,
            timings,
        }
    }

    /// First load. Only a new player at the first step gets the onboarding
    /// reveal; everyone else gets a transcript refresh shortly after. Status
    /// is fetched either way.
    pub async fn begin_session(&self) -> Option<TutorialStep> {
        let onboarding = self.store.read(|state| {
            state.is_new_player && state.tutorial_step == TutorialStep::Welcome
        });
        let pending = if onboarding {
            self.check_tutorial(TutorialTrigger::SessionStart)
        } else {
            let reconciler = self.reconciler.clone();
            self.scheduler
                .schedule(self.timings.returning_player_refresh, async move {
                    if let Err(error) = reconciler.refresh().await {
                        warn!(%error, "initial transcript refresh failed");
                    }
                });
            None
        };

        if let Err(error) = self.reconciler.refresh_status().await {
            warn!(%error, "initial status fetch failed");
        }
        pending
    }

    pub async fn submit(&self, command_text: &str) -> SubmitOutcome {
        let command = command_text.trim();
        if command.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.store.set_user_interacting(true);
        self.store.push_command(command);
        let count = self.store.increment_command_count();
        debug!(%command, count, "submitting command");

        let action_group = self.log.start_group(Some(ACTION_GROUP_TITLE));
        self.log
            .add_entry(Category::Player, format!("{PLAYER_MARKER} {command}"));

        let outcome = match self.dispatch_and_reconcile(command, action_group).await {
            Ok(()) => SubmitOutcome::Completed {
                tutorial: self.check_tutorial(TutorialTrigger::Command(command)),
            },
            Err(error) => self.report_failure(error),
        };

        self.release_interaction();
        outcome
    }

    /// Onboarding decision at step 1; `index` is zero-based into [`PATH_CHOICES`].
    pub async fn choose_path(&self, index: usize) -> SubmitOutcome {
        let Some(choice) = PATH_CHOICES.get(index) else {
            return SubmitOutcome::Ignored;
        };

        self.store.set_user_interacting(true);
        let group = self.log.start_group(Some(CHOICE_GROUP_TITLE));
        self.log.add_entry(
            Category::Player,
            format!("{PLAYER_MARKER} Choice: {}", choice.label),
        );

        let command = format!("choose {}", index + 1);
        let result = match self.reconciler.backend().dispatch_command(&command).await {
            Ok(_) => self.reconciler.refresh().await,
            Err(error) => Err(error),
        };
        let failure = result.err().map(|error| self.report_failure(error));

        let tutorial = self.check_tutorial(TutorialTrigger::PathChosen);
        if tutorial.is_none() {
            self.log.finish_if_open(group);
        }

        self.release_interaction();
        failure.unwrap_or(SubmitOutcome::Completed { tutorial })
    }

    async fn dispatch_and_reconcile(
        &self,
        command: &str,
        action_group: GroupId,
    ) -> Result<(), RemoteError> {
        self.reconciler.backend().dispatch_command(command).await?;

        let log = self.log.clone();
        self.scheduler
            .schedule_fn(self.timings.action_group_finish, move || {
                log.finish_if_open(action_group);
            });

        self.reconciler.refresh().await
    }

    fn report_failure(&self, error: RemoteError) -> SubmitOutcome {
        warn!(operation = %error.operation, %error, "command round trip failed");
        self.log.post_group(
            ERROR_GROUP_TITLE,
            &[(Category::Warning, COMMAND_FAILED_TEXT)],
        );
        SubmitOutcome::Failed {
            reason: error.to_string(),
        }
    }

    fn release_interaction(&self) {
        let store = self.store.clone();
        self.scheduler
            .schedule_fn(self.timings.interaction_grace, move || {
                store.set_user_interacting(false);
            });
    }

    fn check_tutorial(&self, trigger: TutorialTrigger<'_>) -> Option<TutorialStep> {
        let step = self.store.read(|state| state.tutorial_step);
        let transition = transition_for(step, trigger)?;
        self.schedule_reveal(transition);
        Some(transition.to)
    }

    fn schedule_reveal(&self, transition: Transition) {
        let store = self.store.clone();
        let log = self.log.clone();
        let sink = self.sink.clone();
        self.scheduler.schedule_fn(transition.delay, move || {
            // The step may have moved while the reveal was pending.
            if !store.advance_tutorial(transition.from, transition.to) {
                debug!(from = ?transition.from, "tutorial reveal superseded");
                return;
            }
            let reveal = transition.reveal;
            log.post_group(reveal.title, reveal.entries);
            if reveal.present_choices {
                sink.present_choices(CHOICE_PROMPT, &PATH_CHOICES);
            }
            if let Some(achievement) = reveal.achievement() {
                if let Some(unlocked) = store.unlock_achievement() {
                    let total = store.read(|state| state.achievement_total);
                    info!(title = %achievement.title, unlocked, total, "achievement unlocked");
                    sink.announce_achievement(&achievement, unlocked, total);
                }
            }
            info!(step = transition.to.index(), "tutorial advanced");
        });
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
