//! Sync engine integration tests
//!
//! Drain passes against scripted remotes, including failure, concurrency
//! and restart scenarios.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use fieldreport::client::error::{QueueError, SyncError};
use fieldreport::client::local_db::{KeyValueStore, LocalDatabase, MemoryStore};
use fieldreport::client::offline::{QueueStore, OFFLINE_REPORTS_KEY};
use fieldreport::client::sync::{SkipReason, SyncConfig, SyncEngine, SyncTrigger, TriggerOutcome};
use crate::{assert_drained, assert_err, assert_ok};

use crate::common::{payload, wait_until, FlakyStore, RecordingNotifier, ScriptedApi, WAIT};

fn engine_with(
    store: Arc<dyn KeyValueStore>,
    api: Arc<ScriptedApi>,
    config: SyncConfig,
) -> (Arc<SyncEngine>, Arc<QueueStore>, Arc<RecordingNotifier>) {
    let queue = Arc::new(QueueStore::new(store));
    let notifier = RecordingNotifier::new();
    let engine = Arc::new(SyncEngine::new(queue.clone(), api, notifier.clone(), config));
    (engine, queue, notifier)
}

fn engine(api: Arc<ScriptedApi>) -> (Arc<SyncEngine>, Arc<QueueStore>, Arc<RecordingNotifier>) {
    engine_with(Arc::new(MemoryStore::new()), api, SyncConfig::default())
}

async fn pending_ids(queue: &QueueStore) -> Vec<Uuid> {
    queue
        .list_all()
        .await
        .unwrap()
        .iter()
        .map(|item| item.local_id)
        .collect()
}

#[tokio::test]
async fn test_reconnect_drains_and_keeps_rejected_report() {
    let api = ScriptedApi::failing(&["B"]);
    let (engine, queue, notifier) = engine(api.clone());

    engine.on_trigger(SyncTrigger::ConnectivityChanged(false)).await.unwrap();
    let _a = queue.enqueue(payload("A")).await.unwrap();
    let b = queue.enqueue(payload("B")).await.unwrap();
    let _c = queue.enqueue(payload("C")).await.unwrap();

    let summary = assert_drained!(assert_ok!(
        engine.on_trigger(SyncTrigger::ConnectivityChanged(true)).await
    ));

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.failed, vec![b]);
    assert_eq!(pending_ids(&queue).await, vec![b]);
    assert_eq!(api.submitted_titles(), vec!["A", "B", "C"]);
    assert_eq!(
        notifier.messages(),
        vec![
            "Synchronizing 3 report(s)...".to_string(),
            "2 report(s) synchronized successfully.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_manual_sync_offline_is_rejected_without_network() {
    let api = ScriptedApi::accepting();
    let (engine, queue, notifier) = engine(api.clone());
    let a = queue.enqueue(payload("A")).await.unwrap();

    engine.on_trigger(SyncTrigger::ConnectivityChanged(false)).await.unwrap();
    let outcome = engine.on_trigger(SyncTrigger::Manual).await.unwrap();

    assert_eq!(outcome, TriggerOutcome::Rejected);
    assert_eq!(pending_ids(&queue).await, vec![a]);
    assert_eq!(api.started(), 0);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_staying_online_triggers_nothing() {
    let api = ScriptedApi::accepting();
    let (engine, queue, notifier) = engine(api.clone());
    queue.enqueue(payload("A")).await.unwrap();

    for _ in 0..3 {
        let outcome = engine.on_trigger(SyncTrigger::ConnectivityChanged(true)).await.unwrap();
        assert_eq!(outcome, TriggerOutcome::Skipped(SkipReason::NoTransition));
    }

    assert_eq!(api.started(), 0);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_one_pass_per_reconnect() {
    let api = ScriptedApi::failing(&["A"]);
    let (engine, queue, _notifier) = engine(api.clone());
    queue.enqueue(payload("A")).await.unwrap();

    for _ in 0..2 {
        engine.on_trigger(SyncTrigger::ConnectivityChanged(false)).await.unwrap();
        engine.on_trigger(SyncTrigger::ConnectivityChanged(true)).await.unwrap();
        engine.on_trigger(SyncTrigger::ConnectivityChanged(true)).await.unwrap();
    }

    assert_eq!(api.started(), 2);
    assert_eq!(queue.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_restart_drains_reports_from_previous_process() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");

    {
        let db = LocalDatabase::open(&path).await.unwrap();
        let queue = QueueStore::new(Arc::new(db.clone()));
        queue.enqueue(payload("A")).await.unwrap();
        queue.enqueue(payload("B")).await.unwrap();
        db.close().await;
    }

    let db = LocalDatabase::open(&path).await.unwrap();
    let api = ScriptedApi::accepting();
    let (engine, queue, _notifier) = engine_with(Arc::new(db), api.clone(), SyncConfig::default());

    let summary = assert_drained!(engine.on_trigger(SyncTrigger::AppForegrounded).await.unwrap());

    assert_eq!(summary.succeeded.len(), 2);
    assert_eq!(api.submitted_titles(), vec!["A", "B"]);
    assert_eq!(queue.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_trigger_during_pass_is_dropped_and_late_enqueue_survives() {
    let (api, gate) = ScriptedApi::gated();
    let (engine, queue, notifier) = engine(api.clone());
    let a = queue.enqueue(payload("A")).await.unwrap();

    let running = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.on_trigger(SyncTrigger::Manual).await })
    };
    assert!(wait_until(WAIT, || api.started() == 1).await);
    assert!(engine.is_syncing());

    let second = engine.on_trigger(SyncTrigger::AppForegrounded).await.unwrap();
    assert_eq!(second, TriggerOutcome::Skipped(SkipReason::AlreadySyncing));

    let late = queue.enqueue(payload("late")).await.unwrap();
    gate.add_permits(1);

    let summary = assert_drained!(running.await.unwrap().unwrap());
    assert_eq!(summary.succeeded, vec![a]);
    assert_eq!(pending_ids(&queue).await, vec![late]);
    assert_eq!(api.started(), 1);
    assert!(!engine.is_syncing());
    assert_eq!(notifier.messages().len(), 2);
}

#[tokio::test]
async fn test_report_filed_by_another_process_during_pass_survives_commit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");
    let watcher_db = LocalDatabase::open(&path).await.unwrap();
    let submitter_db = LocalDatabase::open(&path).await.unwrap();

    let (api, gate) = ScriptedApi::gated();
    let (engine, queue, _notifier) = engine_with(Arc::new(watcher_db), api.clone(), SyncConfig::default());
    let other = QueueStore::new(Arc::new(submitter_db.clone()));
    let a = queue.enqueue(payload("A")).await.unwrap();

    let running = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.on_trigger(SyncTrigger::Manual).await })
    };
    assert!(wait_until(WAIT, || api.started() == 1).await);

    let b = other.enqueue(payload("B")).await.unwrap();
    gate.add_permits(1);

    let summary = assert_drained!(running.await.unwrap().unwrap());
    assert_eq!(summary.succeeded, vec![a]);
    assert_eq!(pending_ids(&queue).await, vec![b]);
    assert_eq!(pending_ids(&other).await, vec![b]);

    // still there after both handles go away
    submitter_db.close().await;
    let reopened = QueueStore::new(Arc::new(LocalDatabase::open(&path).await.unwrap()));
    assert_eq!(pending_ids(&reopened).await, vec![b]);
}

#[tokio::test]
async fn test_commits_and_enqueues_from_two_handles_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");
    let drainer = Arc::new(QueueStore::new(Arc::new(LocalDatabase::open(&path).await.unwrap())));
    let reporter = Arc::new(QueueStore::new(Arc::new(LocalDatabase::open(&path).await.unwrap())));

    let mut acknowledged = Vec::new();
    for i in 0..20 {
        acknowledged.push(drainer.enqueue(payload(&format!("old {}", i))).await.unwrap());
    }

    let commits = {
        let drainer = drainer.clone();
        let acknowledged = acknowledged.clone();
        tokio::spawn(async move {
            for id in acknowledged {
                drainer.remove_acknowledged(&[id]).await.unwrap();
            }
        })
    };
    let enqueues = {
        let reporter = reporter.clone();
        tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..20 {
                ids.push(reporter.enqueue(payload(&format!("new {}", i))).await.unwrap());
            }
            ids
        })
    };
    commits.await.unwrap();
    let filed = enqueues.await.unwrap();

    assert_eq!(pending_ids(&drainer).await, filed);
}

#[tokio::test]
async fn test_slow_submission_times_out_and_stays_queued() {
    let api = ScriptedApi::slow(Duration::from_millis(500));
    let config = SyncConfig {
        submit_timeout: Duration::from_millis(20),
        ..SyncConfig::default()
    };
    let (engine, queue, notifier) = engine_with(Arc::new(MemoryStore::new()), api, config);
    let a = queue.enqueue(payload("A")).await.unwrap();

    let summary = assert_drained!(engine.on_trigger(SyncTrigger::Manual).await.unwrap());

    assert_eq!(summary.failed, vec![a]);
    assert_eq!(pending_ids(&queue).await, vec![a]);
    assert_eq!(
        notifier.messages().last().map(String::as_str),
        Some("Sync failed. Will retry later.")
    );
}

#[tokio::test]
async fn test_concurrent_submissions_report_in_queue_order() {
    let api = ScriptedApi::failing(&["3"]);
    let config = SyncConfig {
        max_concurrent_submissions: 4,
        ..SyncConfig::default()
    };
    let (engine, queue, _notifier) = engine_with(Arc::new(MemoryStore::new()), api.clone(), config);

    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(queue.enqueue(payload(&i.to_string())).await.unwrap());
    }

    let summary = assert_drained!(engine.on_trigger(SyncTrigger::Manual).await.unwrap());

    let mut expected = ids.clone();
    let rejected = expected.remove(3);
    assert_eq!(summary.succeeded, expected);
    assert_eq!(summary.failed, vec![rejected]);
    assert_eq!(pending_ids(&queue).await, vec![rejected]);
    assert_eq!(api.started(), 6);
}

#[tokio::test]
async fn test_failed_reports_go_out_on_a_later_pass() {
    let api = ScriptedApi::failing(&["A", "B"]);
    let (engine, queue, notifier) = engine(api.clone());
    queue.enqueue(payload("A")).await.unwrap();
    queue.enqueue(payload("B")).await.unwrap();

    let first = assert_drained!(engine.on_trigger(SyncTrigger::Manual).await.unwrap());
    assert_eq!(first.succeeded.len(), 0);

    api.set_failing(&[]);
    let second = assert_drained!(engine.on_trigger(SyncTrigger::Manual).await.unwrap());
    assert_eq!(second.succeeded.len(), 2);
    assert_eq!(queue.pending_count().await.unwrap(), 0);

    assert_eq!(
        notifier.messages(),
        vec![
            "Synchronizing 2 report(s)...".to_string(),
            "Sync failed. Will retry later.".to_string(),
            "Synchronizing 2 report(s)...".to_string(),
            "2 report(s) synchronized successfully.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unreadable_queue_aborts_before_network() {
    let store = FlakyStore::new();
    let api = ScriptedApi::accepting();
    let (engine, _queue, notifier) = engine_with(store.clone(), api.clone(), SyncConfig::default());
    store.fail_reads(true);

    let result = engine.on_trigger(SyncTrigger::Manual).await;

    assert_err!(result, SyncError::Aborted(QueueError::Storage(_)));
    assert_eq!(api.started(), 0);
    assert!(notifier.messages().is_empty());
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_commit_failure_leaves_store_unchanged() {
    let store = FlakyStore::new();
    let api = ScriptedApi::accepting();
    let (engine, queue, notifier) = engine_with(store.clone(), api.clone(), SyncConfig::default());
    let a = queue.enqueue(payload("A")).await.unwrap();
    store.fail_writes(true);

    let result = engine.on_trigger(SyncTrigger::Manual).await;

    assert_err!(result, SyncError::Aborted(_));
    // the server got it; the report stays queued and will be sent again
    assert_eq!(api.started(), 1);
    assert_eq!(pending_ids(&queue).await, vec![a]);
    assert_eq!(notifier.messages(), vec!["Synchronizing 1 report(s)...".to_string()]);
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_duplicate_ids_on_disk_abort_the_pass() {
    let store = Arc::new(MemoryStore::new());
    let api = ScriptedApi::accepting();
    let (engine, queue, _notifier) = engine_with(store.clone(), api.clone(), SyncConfig::default());
    queue.enqueue(payload("A")).await.unwrap();
    let item = queue.list_all().await.unwrap().remove(0);
    let corrupted = serde_json::to_string(&vec![item.clone(), item]).unwrap();
    store.set(OFFLINE_REPORTS_KEY, &corrupted).await.unwrap();

    let result = engine.on_trigger(SyncTrigger::Manual).await;

    assert_err!(result, SyncError::Aborted(QueueError::IntegrityViolation { .. }));
    assert_eq!(api.started(), 0);
}

#[tokio::test]
async fn test_status_reflects_store() {
    let api = ScriptedApi::accepting();
    let (engine, queue, _notifier) = engine(api);
    queue.enqueue(payload("A")).await.unwrap();

    let before = engine.status().await.unwrap();
    assert_eq!(before.pending, 1);
    assert!(before.is_online);

    engine.on_trigger(SyncTrigger::Manual).await.unwrap();
    engine.on_trigger(SyncTrigger::ConnectivityChanged(false)).await.unwrap();

    let after = engine.status().await.unwrap();
    assert_eq!(after.pending, 0);
    assert!(!after.is_online);
    assert!(!after.is_syncing);
}
