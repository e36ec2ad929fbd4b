//! # Network Monitor
//!
//! Publishes a boolean reachability signal and feeds its changes into the
//! sync engine.
//!
//! The signal lives in a `tokio::sync::watch` channel, so subscribers only
//! ever see the latest value: a quick false/true flap that happens while the
//! adapter is busy collapses into the final value. The signal starts as
//! `true`; an unknown state is treated as reachable.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::api::ReportApi;
use crate::client::sync::{SyncEngine, SyncTrigger};

/// Source of the connectivity signal
#[derive(Debug)]
pub struct ConnectivityMonitor {
    sender: watch::Sender<bool>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self::with_initial(None)
    }

    /// Seed the signal; `None` means unknown and is published as online
    pub fn with_initial(online: Option<bool>) -> Self {
        let (sender, _) = watch::channel(online.unwrap_or(true));
        Self { sender }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Publish a new value; returns true if it differs from the current one
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!(online, "Connectivity changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Check the server once, publish the result and return it
    pub async fn probe(&self, api: &dyn ReportApi) -> bool {
        let online = match api.check_status().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Server unreachable: {}", e);
                false
            }
        };
        self.set_online(online);
        online
    }

    /// Probe the server every `interval` and publish the result
    pub fn spawn_polling(self: Arc<Self>, api: Arc<dyn ReportApi>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.probe(api.as_ref()).await;
            }
        })
    }
}

/// Forward every connectivity value to `engine`
///
/// The current value is delivered first, then each change. Triggers are
/// handled one at a time; the task ends when the monitor is dropped.
pub fn attach_connectivity(engine: Arc<SyncEngine>, mut receiver: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let initial = *receiver.borrow_and_update();
        engine.dispatch(SyncTrigger::ConnectivityChanged(initial)).await;

        while receiver.changed().await.is_ok() {
            let online = *receiver.borrow_and_update();
            engine.dispatch(SyncTrigger::ConnectivityChanged(online)).await;
        }
        tracing::debug!("Connectivity signal closed");
    })
}
