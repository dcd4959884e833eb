use super::*;
use crate::{
    aggregator::{AggregatorTimings, LogAggregator},
    error::RemoteOperation,
    scheduler::Scheduler,
    tests_support::{settle, FakeBackend, RecordingSink},
};
use shared::protocol::RefreshSignal;

fn poller(backend: Arc<FakeBackend>) -> (ReconciliationPoller, Arc<SessionStore>, Arc<LogAggregator>) {
    let store = SessionStore::new();
    let log = LogAggregator::new(
        RecordingSink::new(),
        Scheduler::new(),
        AggregatorTimings::default(),
    );
    let reconciler = Reconciler::new(backend, store.clone(), log.clone());
    (
        ReconciliationPoller::new(store.clone(), reconciler, DEFAULT_POLL_INTERVAL),
        store,
        log,
    )
}

fn signal(refresh: bool, last_update: Option<f64>) -> Option<RefreshSignal> {
    Some(RefreshSignal {
        refresh,
        last_update,
    })
}

#[tokio::test]
async fn skips_without_fetching_while_user_is_interacting() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    backend.set_signal(signal(true, Some(10.0)));
    let (poller, store, _) = poller(backend.clone());
    store.set_user_interacting(true);

    assert_eq!(poller.tick().await, PollOutcome::SkippedInteracting);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn newer_signal_triggers_refresh_and_records_timestamp() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    backend
        .logs
        .lock()
        .expect("logs")
        .push("【战斗】a wolf appears".to_string());
    backend.set_signal(signal(true, Some(1_700_000_000.5)));
    let (poller, store, log) = poller(backend.clone());

    assert_eq!(poller.tick().await, PollOutcome::Refreshed);

    let state = store.state();
    assert_eq!(state.last_update_time, 1_700_000_000.5);
    assert_eq!(state.last_known_refresh_signal, signal(true, Some(1_700_000_000.5)));
    assert!(log.contains_text("【战斗】a wolf appears"));
    assert_eq!(backend.count(RemoteOperation::FetchLog), 1);
}

#[tokio::test]
async fn identical_signal_is_not_refreshed_twice() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    backend.set_signal(signal(true, Some(5.0)));
    let (poller, _, _) = poller(backend.clone());

    assert_eq!(poller.tick().await, PollOutcome::Refreshed);
    assert_eq!(poller.tick().await, PollOutcome::Unchanged);
    assert_eq!(backend.count(RemoteOperation::FetchRefreshSignal), 2);
    assert_eq!(backend.count(RemoteOperation::FetchLog), 1);
}

#[tokio::test]
async fn changed_signal_with_older_timestamp_is_stored_only() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    backend.set_signal(signal(true, Some(20.0)));
    let (poller, store, _) = poller(backend.clone());
    poller.tick().await;

    backend.set_signal(signal(true, Some(15.0)));
    assert_eq!(poller.tick().await, PollOutcome::Stale);

    let state = store.state();
    assert_eq!(state.last_update_time, 20.0);
    assert_eq!(state.last_known_refresh_signal, signal(true, Some(15.0)));
    assert_eq!(backend.count(RemoteOperation::FetchLog), 1);
}

#[tokio::test]
async fn signal_without_timestamp_or_refresh_flag_never_refreshes() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    backend.set_signal(signal(true, None));
    let (poller, _, _) = poller(backend.clone());
    assert_eq!(poller.tick().await, PollOutcome::Stale);

    backend.set_signal(signal(false, Some(99.0)));
    assert_eq!(poller.tick().await, PollOutcome::Stale);
    assert_eq!(backend.count(RemoteOperation::FetchLog), 0);
}

#[tokio::test]
async fn fetch_failure_counts_as_no_signal() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    let (poller, store, _) = poller(backend.clone());

    assert_eq!(poller.tick().await, PollOutcome::NoSignal);
    assert_eq!(store.state().last_known_refresh_signal, None);
}

#[tokio::test]
async fn failed_refresh_is_retried_on_next_tick() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    backend
        .logs
        .lock()
        .expect("logs")
        .push("【奖励】a spirit stone".to_string());
    *backend.fail_log.lock().expect("fail") = true;
    backend.set_signal(signal(true, Some(3.0)));
    let (poller, store, log) = poller(backend.clone());

    assert_eq!(poller.tick().await, PollOutcome::RefreshFailed);
    let state = store.state();
    assert_eq!(state.last_update_time, 0.0);
    assert_eq!(state.last_known_refresh_signal, None);

    *backend.fail_log.lock().expect("fail") = false;
    assert_eq!(poller.tick().await, PollOutcome::Refreshed);
    assert_eq!(store.state().last_update_time, 3.0);
    assert_eq!(backend.count(RemoteOperation::FetchLog), 2);
    assert!(log.contains_text("【奖励】a spirit stone"));
}

#[tokio::test(start_paused = true)]
async fn spawned_loop_ticks_on_interval_and_on_demand() {
    let backend = FakeBackend::with_health(50.0, 100.0);
    backend.set_signal(signal(false, None));
    let (poller, _, _) = poller(backend.clone());
    let handle = poller.spawn();

    settle(10).await;
    assert_eq!(backend.count(RemoteOperation::FetchRefreshSignal), 0);

    handle.check_now();
    settle(10).await;
    assert_eq!(backend.count(RemoteOperation::FetchRefreshSignal), 1);

    settle(5_000).await;
    assert_eq!(backend.count(RemoteOperation::FetchRefreshSignal), 2);

    handle.stop().await;
    settle(20_000).await;
    assert_eq!(backend.count(RemoteOperation::FetchRefreshSignal), 2);
}
