//! Report submission tests
//!
//! The submit path and the sync engine sharing one queue.

use assert_matches::assert_matches;
use std::sync::Arc;
use tokio::sync::watch;

use fieldreport::client::local_db::{KeyValueStore, LocalDatabase};
use fieldreport::client::offline::{QueueStore, ReportSubmitter, SubmissionOutcome, REPORTER_NAME_KEY};
use fieldreport::client::sync::{SyncConfig, SyncEngine, SyncTrigger};
use fieldreport::shared::ANONYMOUS_REPORTER;

use crate::common::{draft, RecordingNotifier, ScriptedApi};
use crate::{assert_drained, assert_ok};

#[tokio::test]
async fn test_offline_report_is_sent_after_reconnect() {
    let db = Arc::new(LocalDatabase::in_memory().await.unwrap());
    let queue = Arc::new(QueueStore::new(db.clone()));
    let api = ScriptedApi::accepting();
    let notifier = RecordingNotifier::new();
    let (connectivity, receiver) = watch::channel(false);

    let submitter = ReportSubmitter::new(api.clone(), queue.clone(), db.clone(), receiver);
    let engine = SyncEngine::new(queue.clone(), api.clone(), notifier.clone(), SyncConfig::default());
    engine.on_trigger(SyncTrigger::ConnectivityChanged(false)).await.unwrap();

    let outcome = assert_ok!(submitter.submit(draft("Broken gate", "Dana")).await);
    let local_id = match outcome {
        SubmissionOutcome::SavedOffline { local_id } => local_id,
        other => panic!("expected offline save, got {:?}", other),
    };
    assert_eq!(api.started(), 0);

    connectivity.send(true).unwrap();
    let summary = assert_drained!(engine
        .on_trigger(SyncTrigger::ConnectivityChanged(true))
        .await
        .unwrap());

    assert_eq!(summary.succeeded, vec![local_id]);
    assert_eq!(api.submitted_titles(), vec!["Broken gate"]);
    assert_eq!(queue.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_send_failure_is_queued_then_retried() {
    let db = Arc::new(LocalDatabase::in_memory().await.unwrap());
    let queue = Arc::new(QueueStore::new(db.clone()));
    let api = ScriptedApi::failing(&["Broken gate"]);
    let (_connectivity, receiver) = watch::channel(true);
    let submitter = ReportSubmitter::new(api.clone(), queue.clone(), db.clone(), receiver);

    let outcome = assert_ok!(submitter.submit(draft("Broken gate", "Dana")).await);
    assert_matches!(outcome, SubmissionOutcome::SavedAfterFailure { .. });
    assert_eq!(queue.pending_count().await.unwrap(), 1);

    api.set_failing(&[]);
    let engine = SyncEngine::new(queue.clone(), api.clone(), RecordingNotifier::new(), SyncConfig::default());
    assert_drained!(engine.on_trigger(SyncTrigger::Manual).await.unwrap());

    assert_eq!(queue.pending_count().await.unwrap(), 0);
    assert_eq!(api.submitted_titles(), vec!["Broken gate", "Broken gate"]);
}

#[tokio::test]
async fn test_reporter_name_is_remembered_in_store() {
    let db = Arc::new(LocalDatabase::in_memory().await.unwrap());
    let queue = Arc::new(QueueStore::new(db.clone()));
    let (_connectivity, receiver) = watch::channel(true);
    let submitter = ReportSubmitter::new(ScriptedApi::accepting(), queue, db.clone(), receiver);

    submitter.submit(draft("One", "Dana")).await.unwrap();
    let mut anonymous = draft("Two", "ignored");
    anonymous.is_anonymous = true;
    submitter.submit(anonymous).await.unwrap();

    assert_eq!(db.get(REPORTER_NAME_KEY).await.unwrap(), Some("Dana".to_string()));
    assert_eq!(submitter.last_reporter_name().await, Some("Dana".to_string()));
}

#[tokio::test]
async fn test_anonymous_report_goes_out_without_name() {
    let db = Arc::new(LocalDatabase::in_memory().await.unwrap());
    let queue = Arc::new(QueueStore::new(db.clone()));
    let (_connectivity, receiver) = watch::channel(false);
    let submitter = ReportSubmitter::new(ScriptedApi::accepting(), queue.clone(), db, receiver);

    let mut anonymous = draft("Harassment", "Dana");
    anonymous.is_anonymous = true;
    submitter.submit(anonymous).await.unwrap();

    let queued = queue.list_all().await.unwrap();
    assert_eq!(queued[0].payload.reporter_name, ANONYMOUS_REPORTER);
    assert!(queued[0].payload.is_anonymous);
}
