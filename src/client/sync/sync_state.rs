//! # Sync State
//!
//! Types describing what the sync engine was asked to do and what it did.
//! None of this is persisted: a restarted process starts from
//! `SyncRunState { is_syncing: false, .. }` and rediscovers pending work
//! from the queue store.

use uuid::Uuid;

/// Why a drain pass was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The connectivity signal reported a value (edge-detected by the engine)
    ConnectivityChanged(bool),
    /// The host application came back to the foreground
    AppForegrounded,
    /// The user asked to sync now
    Manual,
}

/// Why a trigger did not start a drain pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another pass is in flight
    AlreadySyncing,
    /// Connectivity is currently false
    Offline,
    /// Connectivity stayed true; only the offline to online edge drains
    NoTransition,
    /// Nothing is queued
    EmptyQueue,
}

/// Result of one completed drain pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainSummary {
    /// Size of the snapshot taken at the start of the pass
    pub attempted: usize,
    /// Acknowledged and removed from the store, in snapshot order
    pub succeeded: Vec<Uuid>,
    /// Still queued, in snapshot order
    pub failed: Vec<Uuid>,
}

impl DrainSummary {
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// What the engine did with a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A pass ran to completion
    Drained(DrainSummary),
    /// No pass ran and nothing was emitted
    Skipped(SkipReason),
    /// A manual sync was refused because the device is offline
    Rejected,
}

impl TriggerOutcome {
    pub fn summary(&self) -> Option<&DrainSummary> {
        match self {
            TriggerOutcome::Drained(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Transient engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRunState {
    /// True exactly while a drain pass is in flight
    pub is_syncing: bool,
    /// Last observed connectivity value
    pub last_connection_state: bool,
}

/// Snapshot for status indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub is_online: bool,
    /// Read from the queue store, never cached
    pub pending: usize,
}
