//! # Sync Engine
//!
//! Drains the offline queue when the device regains connectivity, when the
//! app returns to the foreground, or when the user asks for it.
//!
//! ## Drain pass
//!
//! 1. Take a snapshot of the queue
//! 2. Submit every item, each bounded by `submit_timeout`
//! 3. Remove exactly the acknowledged ids from the store
//! 4. Emit one outcome notification
//!
//! Failures are recovered per item: a failed item simply stays queued for
//! the next pass. Only a queue read or commit failure aborts the pass, and
//! in that case the store is left as it was.
//!
//! At most one pass runs per engine. Triggers that arrive while a pass is in
//! flight are dropped, not deferred; the next trigger picks up whatever is
//! still queued.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fieldreport::client::api::HttpReportApi;
//! use fieldreport::client::local_db::MemoryStore;
//! use fieldreport::client::offline::QueueStore;
//! use fieldreport::client::sync::{SyncConfig, SyncEngine, SyncTrigger, TracingNotifier};
//! use fieldreport::client::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new();
//! let queue = Arc::new(QueueStore::new(Arc::new(MemoryStore::new())));
//! let api = Arc::new(HttpReportApi::new(&config)?);
//! let engine = SyncEngine::new(queue, api, Arc::new(TracingNotifier), SyncConfig::from(&config));
//!
//! let outcome = engine.on_trigger(SyncTrigger::Manual).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod lifecycle;
pub mod network_monitor;
pub mod notifier;
pub mod sync_state;

pub use lifecycle::{attach_lifecycle, AppPhase, LifecycleSignal};
pub use network_monitor::{attach_connectivity, ConnectivityMonitor};
pub use notifier::{ChannelNotifier, NotificationSink, TracingNotifier};
pub use sync_state::{DrainSummary, SkipReason, SyncRunState, SyncStatus, SyncTrigger, TriggerOutcome};

use futures_util::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::client::api::ReportApi;
use crate::client::config::Config;
use crate::client::error::{RemoteError, SyncError};
use crate::client::offline::{QueueStore, QueuedReport};

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Upper bound on a single submission
    pub submit_timeout: Duration,
    /// Submissions in flight during a pass; 1 sends strictly in queue order
    pub max_concurrent_submissions: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(15),
            max_concurrent_submissions: 1,
        }
    }
}

impl From<&Config> for SyncConfig {
    fn from(config: &Config) -> Self {
        Self {
            submit_timeout: config.submit_timeout(),
            max_concurrent_submissions: config.max_concurrent_submissions().max(1),
        }
    }
}

/// Clears the in-flight flag when a pass ends, including on early return
struct PassGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Queue drainer
pub struct SyncEngine {
    queue: Arc<QueueStore>,
    api: Arc<dyn ReportApi>,
    notifier: Arc<dyn NotificationSink>,
    config: SyncConfig,
    is_syncing: AtomicBool,
    last_connection_state: AtomicBool,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("state", &self.run_state())
            .finish()
    }
}

impl SyncEngine {
    /// Create an engine that assumes the device is online until told otherwise
    pub fn new(
        queue: Arc<QueueStore>,
        api: Arc<dyn ReportApi>,
        notifier: Arc<dyn NotificationSink>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            api,
            notifier,
            config,
            is_syncing: AtomicBool::new(false),
            last_connection_state: AtomicBool::new(true),
        }
    }

    /// Handle one trigger, possibly running a drain pass
    pub async fn on_trigger(&self, trigger: SyncTrigger) -> Result<TriggerOutcome, SyncError> {
        match trigger {
            SyncTrigger::ConnectivityChanged(online) => {
                let previous = self.last_connection_state.swap(online, Ordering::AcqRel);
                if !online {
                    if previous {
                        tracing::info!("Connection lost, reports will be queued");
                    }
                    return Ok(TriggerOutcome::Skipped(SkipReason::Offline));
                }
                if previous {
                    return Ok(TriggerOutcome::Skipped(SkipReason::NoTransition));
                }
                tracing::info!("Connection restored, draining offline queue");
            }
            SyncTrigger::AppForegrounded => {
                if !self.is_online() {
                    tracing::debug!("App foregrounded while offline, not syncing");
                    return Ok(TriggerOutcome::Skipped(SkipReason::Offline));
                }
            }
            SyncTrigger::Manual => {
                if !self.is_online() {
                    tracing::info!("Manual sync requested while offline");
                    self.notifier.notify(notifier::SYNC_REJECTED_OFFLINE);
                    return Ok(TriggerOutcome::Rejected);
                }
            }
        }

        self.drain(trigger).await
    }

    /// Handle a trigger on behalf of an adapter task
    ///
    /// Errors are logged instead of returned; the adapter keeps listening.
    pub async fn dispatch(&self, trigger: SyncTrigger) -> Option<TriggerOutcome> {
        match self.on_trigger(trigger).await {
            Ok(outcome) => {
                tracing::debug!(?trigger, ?outcome, "Trigger handled");
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(?trigger, "Sync failed: {}", e);
                None
            }
        }
    }

    async fn drain(&self, trigger: SyncTrigger) -> Result<TriggerOutcome, SyncError> {
        let Some(_pass) = PassGuard::acquire(&self.is_syncing) else {
            tracing::debug!(?trigger, "Drain pass already running, ignoring trigger");
            return Ok(TriggerOutcome::Skipped(SkipReason::AlreadySyncing));
        };

        let snapshot = self.queue.list_all().await.map_err(|e| {
            tracing::error!("Could not read offline queue: {}", e);
            SyncError::from(e)
        })?;
        if snapshot.is_empty() {
            tracing::debug!(?trigger, "Offline queue is empty");
            return Ok(TriggerOutcome::Skipped(SkipReason::EmptyQueue));
        }

        let attempted = snapshot.len();
        tracing::info!(?trigger, pending = attempted, "Starting drain pass");
        self.notifier.notify(&notifier::synchronizing(attempted));

        let acknowledged: HashSet<Uuid> = stream::iter(snapshot.clone())
            .map(|item| self.submit_one(item))
            .buffer_unordered(self.config.max_concurrent_submissions.max(1))
            .filter_map(|(local_id, result)| async move { result.ok().map(|_| local_id) })
            .collect()
            .await;

        let (succeeded, failed): (Vec<Uuid>, Vec<Uuid>) = snapshot
            .iter()
            .map(|item| item.local_id)
            .partition(|local_id| acknowledged.contains(local_id));

        if succeeded.is_empty() {
            self.notifier.notify(notifier::SYNC_FAILED);
        } else {
            self.queue.remove_acknowledged(&succeeded).await.map_err(|e| {
                tracing::error!(
                    acknowledged = succeeded.len(),
                    "Could not commit drain pass, acknowledged reports stay queued: {}",
                    e
                );
                SyncError::from(e)
            })?;
            self.notifier.notify(&notifier::synchronized(succeeded.len()));
        }

        tracing::info!(
            succeeded = succeeded.len(),
            failed = failed.len(),
            "Drain pass finished"
        );
        Ok(TriggerOutcome::Drained(DrainSummary {
            attempted,
            succeeded,
            failed,
        }))
    }

    async fn submit_one(&self, item: QueuedReport) -> (Uuid, Result<(), RemoteError>) {
        let result = match tokio::time::timeout(
            self.config.submit_timeout,
            self.api.submit(&item.payload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout),
        };

        if let Err(e) = &result {
            tracing::warn!(local_id = %item.local_id, "Report not synced, keeping it queued: {}", e);
        }
        (item.local_id, result)
    }

    /// Status snapshot; the pending count is read from the store
    pub async fn status(&self) -> Result<SyncStatus, SyncError> {
        Ok(SyncStatus {
            is_syncing: self.is_syncing(),
            is_online: self.is_online(),
            pending: self.queue.pending_count().await?,
        })
    }

    pub fn run_state(&self) -> SyncRunState {
        SyncRunState {
            is_syncing: self.is_syncing(),
            last_connection_state: self.is_online(),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing.load(Ordering::Acquire)
    }

    /// Last observed connectivity value
    pub fn is_online(&self) -> bool {
        self.last_connection_state.load(Ordering::Acquire)
    }

    pub fn queue(&self) -> &Arc<QueueStore> {
        &self.queue
    }
}
