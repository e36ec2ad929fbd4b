//! Report fixtures and polling helpers

use std::time::Duration;

use fieldreport::shared::{Category, ReportDraft, ReportPayload};

/// A valid payload with the given title
pub fn payload(title: &str) -> ReportPayload {
    ReportPayload::new(title, "Packing hall", Category::Safety)
        .with_description("Found during the morning walk")
}

/// A valid draft with the given title and reporter
pub fn draft(title: &str, reporter: &str) -> ReportDraft {
    ReportDraft {
        title: title.to_string(),
        location: "Loading bay 3".to_string(),
        category: Some(Category::GeneralServices),
        reporter_name: reporter.to_string(),
        ..ReportDraft::default()
    }
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Default bound for `wait_until` in adapter tests
pub const WAIT: Duration = Duration::from_secs(5);
