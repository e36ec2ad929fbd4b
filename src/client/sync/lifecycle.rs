//! App lifecycle signal
//!
//! Hosts publish `AppPhase` transitions; `attach_lifecycle` turns each
//! return to `Active` into an `AppForegrounded` trigger.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::client::sync::{SyncEngine, SyncTrigger};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Active,
    Inactive,
    Background,
}

#[derive(Debug, Clone)]
pub struct LifecycleSignal {
    sender: broadcast::Sender<AppPhase>,
}

impl Default for LifecycleSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, phase: AppPhase) {
        // no subscribers yet is fine
        let _ = self.sender.send(phase);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppPhase> {
        self.sender.subscribe()
    }
}

/// Forward foreground transitions to `engine`
pub fn attach_lifecycle(engine: Arc<SyncEngine>, mut receiver: broadcast::Receiver<AppPhase>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(AppPhase::Active) => {
                    engine.dispatch(SyncTrigger::AppForegrounded).await;
                }
                Ok(phase) => tracing::debug!(?phase, "App left the foreground"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Lifecycle events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Lifecycle signal closed");
    })
}
