//! Notification sink
//!
//! Write-only surface for the short status strings the sync engine emits.
//! Delivery is fire-and-forget: a sink may drop or overwrite messages.

use tokio::sync::mpsc;

/// Receives human-readable status messages
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str);
}

impl<F> NotificationSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Emits notifications as log events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "fieldreport::notify", "{}", message);
    }
}

/// Forwards notifications to a UI task
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, message: &str) {
        // receiver gone means nobody is displaying; drop
        let _ = self.sender.send(message.to_string());
    }
}

/// "Synchronizing N report(s)..."
pub fn synchronizing(count: usize) -> String {
    format!("Synchronizing {} report(s)...", count)
}

/// "K report(s) synchronized successfully."
pub fn synchronized(count: usize) -> String {
    format!("{} report(s) synchronized successfully.", count)
}

/// Emitted when a non-empty pass had no success
pub const SYNC_FAILED: &str = "Sync failed. Will retry later.";

/// Emitted when sync-now is requested while offline
pub const SYNC_REJECTED_OFFLINE: &str =
    "No connection. Queued reports will be sent when you are back online.";
