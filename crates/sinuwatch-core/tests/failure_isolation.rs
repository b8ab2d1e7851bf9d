//! Failure isolation contract
//!
//! One account's failure must never prevent the remaining accounts from
//! being processed, and a failed notification delivery must never abort an
//! account's pipeline.

mod common;

use common::{
    CountingSnapshotStore, RecordingNotifier, ScriptedGradeSource, drain_events,
    fast_engine_config, record,
};
use sinuwatch_core::config::AccountConfig;
use sinuwatch_core::error::Error;
use sinuwatch_core::{EngineEvent, GradeWatcher, SnapshotStore};

fn account(id: &str, username: &str) -> AccountConfig {
    AccountConfig::new(id).with_credentials(username, "secret")
}

#[tokio::test]
async fn failed_login_aborts_only_that_account() {
    let source = ScriptedGradeSource::new()
        .with_failure("user_a", || Error::auth(200, "Login esuat"))
        .with_grades("user_b", vec![record("Algebra", "1", "1", "9")]);
    let notifier = RecordingNotifier::new();
    let messages = notifier.messages_handle();
    let store = CountingSnapshotStore::new();
    let store_view = CountingSnapshotStore::sharing_state_with(&store);

    let (watcher, mut rx) = GradeWatcher::new(
        Box::new(source),
        Box::new(notifier),
        Box::new(store),
        vec![account("STUDENT_A", "user_a"), account("STUDENT_B", "user_b")],
        fast_engine_config(),
    )
    .unwrap();

    watcher.run().await.unwrap();

    // Account B was still processed and persisted
    assert_eq!(store_view.load("STUDENT_B").await.unwrap().len(), 1);
    assert!(store_view.load("STUDENT_A").await.unwrap().is_empty());

    // Auth failure gets its dedicated wording
    assert!(messages.lock().unwrap().iter().any(|(m, _, tags)| {
        m == "WebSinu login failed for STUDENT_A. Check credentials or site changes."
            && tags == &["error", "x"]
    }));

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::AccountFailed { account_id, category, .. }
            if account_id == "STUDENT_A" && *category == "auth"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::AccountCompleted { account_id, .. } if account_id == "STUDENT_B"
    )));
}

#[tokio::test]
async fn protocol_failure_is_reported_with_its_category() {
    let source = ScriptedGradeSource::new()
        .with_failure("user_a", || Error::protocol("handoff", "<html>...</html>"));
    let notifier = RecordingNotifier::new();
    let messages = notifier.messages_handle();

    let (watcher, mut rx) = GradeWatcher::new(
        Box::new(source),
        Box::new(notifier),
        Box::new(CountingSnapshotStore::new()),
        vec![account("STUDENT_A", "user_a")],
        fast_engine_config(),
    )
    .unwrap();

    watcher.run().await.unwrap();

    assert!(messages.lock().unwrap().iter().any(|(m, _, _)| {
        m == "Failed to retrieve grades for STUDENT_A (protocol error). Check logs."
    }));

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::AccountFailed { category, .. } if *category == "protocol"
    )));
}

#[tokio::test]
async fn notifier_failures_never_abort_the_pipeline() {
    let current = vec![record("Algebra", "1", "1", "9")];
    let source = ScriptedGradeSource::new().with_grades("user_a", current.clone());
    let notifier = RecordingNotifier::failing();
    let call_count = notifier.call_count_handle();
    let store = CountingSnapshotStore::new();
    let store_view = CountingSnapshotStore::sharing_state_with(&store);

    let (watcher, mut rx) = GradeWatcher::new(
        Box::new(source),
        Box::new(notifier),
        Box::new(store),
        vec![account("STUDENT_A", "user_a")],
        fast_engine_config(),
    )
    .unwrap();

    watcher.run().await.unwrap();

    // Deliveries were attempted and all failed, yet the account completed
    assert!(call_count.load(std::sync::atomic::Ordering::SeqCst) > 0);
    assert_eq!(store_view.load("STUDENT_A").await.unwrap(), current);

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::AccountCompleted { account_id, .. } if account_id == "STUDENT_A"
    )));
}

#[tokio::test]
async fn snapshot_write_failure_is_surfaced_but_run_continues() {
    let source = ScriptedGradeSource::new()
        .with_grades("user_a", vec![record("Algebra", "1", "1", "9")])
        .with_grades("user_b", vec![record("Fizica", "1", "1", "10")]);
    let notifier = RecordingNotifier::new();
    let messages = notifier.messages_handle();
    let store = CountingSnapshotStore::failing_saves();
    let save_count = store.save_count_handle();

    let (watcher, mut rx) = GradeWatcher::new(
        Box::new(source),
        Box::new(notifier),
        Box::new(store),
        vec![account("STUDENT_A", "user_a"), account("STUDENT_B", "user_b")],
        fast_engine_config(),
    )
    .unwrap();

    watcher.run().await.unwrap();

    // Both accounts attempted their save despite the first failing
    assert_eq!(save_count.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert!(messages.lock().unwrap().iter().any(|(m, _, _)| {
        m == "Snapshot write failed for STUDENT_A. Check logs."
    }));

    let events = drain_events(&mut rx);
    let failed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::AccountFailed { category, .. } if *category == "snapshot"))
        .collect();
    assert_eq!(failed.len(), 2);
}
