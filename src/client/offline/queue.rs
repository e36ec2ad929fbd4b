//! # Offline Report Queue
//!
//! Durable queue of reports that have not yet been acknowledged by the
//! server. The whole collection is stored as one JSON array under a single
//! reserved key, so every mutation is one atomic replace of the substrate
//! value: after a crash the store holds either the old or the new snapshot.
//!
//! ## Invariants
//!
//! - `local_id` values are unique within the store
//! - A record exists iff the server has not acknowledged it
//! - The store is the only source for the pending count
//!
//! Read-modify-write operations go through `KeyValueStore::update`, so an
//! `enqueue` racing the commit of a drain pass is never lost, even when the
//! two run on different `QueueStore` handles (or processes) sharing one
//! database file.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fieldreport::client::local_db::MemoryStore;
//! use fieldreport::client::offline::QueueStore;
//! use fieldreport::shared::{Category, ReportPayload};
//!
//! # async fn example() -> Result<(), fieldreport::client::error::QueueError> {
//! let queue = QueueStore::new(Arc::new(MemoryStore::new()));
//! let id = queue.enqueue(ReportPayload::new("Broken tap", "Canteen", Category::GeneralServices)).await?;
//!
//! let pending = queue.list_all().await?;
//! assert_eq!(pending[0].local_id, id);
//!
//! queue.remove_acknowledged(&[id]).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::client::error::{QueueError, StorageError};
use crate::client::local_db::{KeyValueStore, KvUpdate};
use crate::shared::ReportPayload;

/// Reserved substrate key holding the queue
pub const OFFLINE_REPORTS_KEY: &str = "@offline_reports";

/// A report waiting to be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedReport {
    /// Client-generated identifier, stable for the life of the record
    pub local_id: Uuid,
    /// Report fields, sent verbatim
    pub payload: ReportPayload,
    /// Time of first enqueue
    pub queued_at: DateTime<Utc>,
}

/// Persisted queue of unsent reports
pub struct QueueStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore").field("key", &self.key).finish()
    }
}

impl QueueStore {
    /// Create a queue stored under the default key
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, OFFLINE_REPORTS_KEY)
    }

    /// Create a queue stored under a custom key
    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Append a report and persist the updated collection
    ///
    /// Returns the freshly assigned local id.
    pub async fn enqueue(&self, payload: ReportPayload) -> Result<Uuid, QueueError> {
        let (local_id, pending) = self
            .modify(move |mut items| {
                let mut local_id = Uuid::new_v4();
                while items.iter().any(|item| item.local_id == local_id) {
                    local_id = Uuid::new_v4();
                }

                items.push(QueuedReport {
                    local_id,
                    payload,
                    queued_at: Utc::now(),
                });
                let pending = items.len();
                Ok((Some(items), (local_id, pending)))
            })
            .await?;

        tracing::info!(%local_id, pending, "Report saved to offline queue");
        Ok(local_id)
    }

    /// All queued reports in insertion order
    pub async fn list_all(&self) -> Result<Vec<QueuedReport>, QueueError> {
        decode(self.kv.get(&self.key).await?.as_deref())
    }

    /// Number of queued reports
    pub async fn pending_count(&self) -> Result<usize, QueueError> {
        Ok(self.list_all().await?.len())
    }

    /// Overwrite the stored collection with exactly `items`
    pub async fn replace_all(&self, items: Vec<QueuedReport>) -> Result<(), QueueError> {
        check_unique(&items)?;
        let json = serde_json::to_string(&items).map_err(StorageError::from)?;
        self.kv.set(&self.key, &json).await?;
        Ok(())
    }

    /// Remove exactly the given ids from the current collection
    ///
    /// Items enqueued after the caller took its snapshot are kept. Unknown
    /// ids are ignored. Returns how many records were removed.
    pub async fn remove_acknowledged(&self, ids: &[Uuid]) -> Result<usize, QueueError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let acknowledged: HashSet<Uuid> = ids.iter().copied().collect();
        self.modify(move |items| {
            let before = items.len();
            let remaining: Vec<QueuedReport> = items
                .into_iter()
                .filter(|item| !acknowledged.contains(&item.local_id))
                .collect();
            let removed = before - remaining.len();
            Ok(((removed > 0).then_some(remaining), removed))
        })
        .await
    }

    /// Drop every queued report
    pub async fn clear_all(&self) -> Result<(), QueueError> {
        self.kv.remove(&self.key).await?;
        tracing::warn!("Offline queue cleared");
        Ok(())
    }

    /// Apply `change` to the stored collection in one substrate update
    ///
    /// `change` returns the collection to write back (`None` leaves the
    /// store untouched) along with the caller's result.
    async fn modify<T, F>(&self, change: F) -> Result<T, QueueError>
    where
        T: Send,
        F: FnOnce(Vec<QueuedReport>) -> Result<(Option<Vec<QueuedReport>>, T), QueueError> + Send,
    {
        let mut outcome: Option<Result<T, QueueError>> = None;
        let slot = &mut outcome;

        self.kv
            .update(
                &self.key,
                Box::new(move |current: Option<String>| {
                    let applied = decode(current.as_deref())
                        .and_then(change)
                        .and_then(|(items, value)| Ok((encode(items)?, value)));
                    match applied {
                        Ok((update, value)) => {
                            *slot = Some(Ok(value));
                            update
                        }
                        Err(e) => {
                            *slot = Some(Err(e));
                            KvUpdate::Keep
                        }
                    }
                }),
            )
            .await?;

        outcome.unwrap_or_else(|| Err(StorageError::backend("queue update was not applied").into()))
    }
}

fn decode(json: Option<&str>) -> Result<Vec<QueuedReport>, QueueError> {
    let items: Vec<QueuedReport> = match json {
        Some(json) => serde_json::from_str(json).map_err(StorageError::from)?,
        None => Vec::new(),
    };
    check_unique(&items)?;
    Ok(items)
}

fn encode(items: Option<Vec<QueuedReport>>) -> Result<KvUpdate, QueueError> {
    match items {
        Some(items) => Ok(KvUpdate::Set(
            serde_json::to_string(&items).map_err(StorageError::from)?,
        )),
        None => Ok(KvUpdate::Keep),
    }
}

fn check_unique(items: &[QueuedReport]) -> Result<(), QueueError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.local_id) {
            tracing::error!(local_id = %item.local_id, "Duplicate local id in offline queue");
            return Err(QueueError::IntegrityViolation {
                local_id: item.local_id,
            });
        }
    }
    Ok(())
}
