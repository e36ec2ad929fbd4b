//! # Offline Submission
//!
//! Everything between the report form and the server when the device may
//! be offline.
//!
//! ## Key Components
//!
//! - `queue.rs`: durable queue of unacknowledged reports
//! - `ReportSubmitter`: the form's submit path. Sends directly when online
//!   and falls back to the queue when offline or when the send fails.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fieldreport::client::api::HttpReportApi;
//! use fieldreport::client::local_db::MemoryStore;
//! use fieldreport::client::offline::{QueueStore, ReportSubmitter};
//! use fieldreport::client::sync::ConnectivityMonitor;
//! use fieldreport::client::Config;
//! use fieldreport::shared::{Category, ReportDraft};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new();
//! let store = Arc::new(MemoryStore::new());
//! let monitor = ConnectivityMonitor::new();
//! let submitter = ReportSubmitter::new(
//!     Arc::new(HttpReportApi::new(&config)?),
//!     Arc::new(QueueStore::new(store.clone())),
//!     store,
//!     monitor.subscribe(),
//! );
//!
//! let draft = ReportDraft {
//!     title: "Exposed wiring".to_string(),
//!     location: "Stairwell B".to_string(),
//!     category: Some(Category::Safety),
//!     ..ReportDraft::default()
//! };
//! let outcome = submitter.submit(draft).await?;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```

pub mod queue;

pub use queue::{QueueStore, QueuedReport, OFFLINE_REPORTS_KEY};

use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::client::api::ReportApi;
use crate::client::error::{RemoteError, SubmitError};
use crate::client::local_db::KeyValueStore;
use crate::shared::ReportDraft;

/// Preference key remembering the last non-anonymous reporter name
pub const REPORTER_NAME_KEY: &str = "userReporterName";

/// Where a submitted report ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Accepted by the server
    Sent,
    /// Device was offline; queued without trying the network
    SavedOffline { local_id: Uuid },
    /// The send failed; queued for the next drain pass
    SavedAfterFailure { local_id: Uuid, error: RemoteError },
}

impl SubmissionOutcome {
    /// Text shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            SubmissionOutcome::Sent => "Report sent successfully.",
            SubmissionOutcome::SavedOffline { .. } => {
                "You are offline. The report was saved and will be sent automatically when you reconnect."
            }
            SubmissionOutcome::SavedAfterFailure { .. } => {
                "The server could not be reached. The report was saved and will be sent later."
            }
        }
    }

    pub fn local_id(&self) -> Option<Uuid> {
        match self {
            SubmissionOutcome::Sent => None,
            SubmissionOutcome::SavedOffline { local_id }
            | SubmissionOutcome::SavedAfterFailure { local_id, .. } => Some(*local_id),
        }
    }
}

/// Submit path of the report form
pub struct ReportSubmitter {
    api: Arc<dyn ReportApi>,
    queue: Arc<QueueStore>,
    preferences: Arc<dyn KeyValueStore>,
    connectivity: watch::Receiver<bool>,
}

impl std::fmt::Debug for ReportSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportSubmitter")
            .field("queue", &self.queue)
            .field("online", &*self.connectivity.borrow())
            .finish()
    }
}

impl ReportSubmitter {
    pub fn new(
        api: Arc<dyn ReportApi>,
        queue: Arc<QueueStore>,
        preferences: Arc<dyn KeyValueStore>,
        connectivity: watch::Receiver<bool>,
    ) -> Self {
        Self {
            api,
            queue,
            preferences,
            connectivity,
        }
    }

    /// Validate and deliver a draft
    ///
    /// Returns an error only when the draft is invalid or the report could
    /// not be saved locally. A failed send is not an error: the report is
    /// queued instead.
    pub async fn submit(&self, draft: ReportDraft) -> Result<SubmissionOutcome, SubmitError> {
        let payload = draft.into_payload()?;
        let reporter_name = (!payload.is_anonymous && !payload.reporter_name.is_empty())
            .then(|| payload.reporter_name.clone());

        let online = *self.connectivity.borrow();
        let outcome = if online {
            match self.api.submit(&payload).await {
                Ok(()) => {
                    tracing::info!("Report '{}' sent", payload.title);
                    SubmissionOutcome::Sent
                }
                Err(error) => {
                    tracing::warn!("Sending report failed, saving it offline: {}", error);
                    let local_id = self.queue.enqueue(payload).await?;
                    SubmissionOutcome::SavedAfterFailure { local_id, error }
                }
            }
        } else {
            let local_id = self.queue.enqueue(payload).await?;
            SubmissionOutcome::SavedOffline { local_id }
        };

        if let Some(name) = reporter_name {
            self.remember_reporter(&name).await;
        }
        Ok(outcome)
    }

    /// Reporter name used on the last non-anonymous submission
    pub async fn last_reporter_name(&self) -> Option<String> {
        match self.preferences.get(REPORTER_NAME_KEY).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Could not read saved reporter name: {}", e);
                None
            }
        }
    }

    async fn remember_reporter(&self, name: &str) {
        // a lost preference must not fail a report that was already handled
        if let Err(e) = self.preferences.set(REPORTER_NAME_KEY, name).await {
            tracing::warn!("Could not save reporter name: {}", e);
        }
    }

    pub fn queue(&self) -> &Arc<QueueStore> {
        &self.queue
    }
}
