/**
 * Report State
 *
 * In-memory storage for accepted reports. Reports are kept in arrival
 * order and lost on restart.
 */

use chrono::Utc;
use uuid::Uuid;

use crate::shared::{Report, ReportPayload, PENDING_REVIEW};

/// Accepted reports, in arrival order
#[derive(Debug, Default)]
pub struct ReportState {
    reports: Vec<Report>,
}

impl ReportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload, assigning a server id, timestamp and review status
    pub fn insert(&mut self, payload: ReportPayload) -> Report {
        let report = Report {
            id: Uuid::new_v4().to_string(),
            payload,
            timestamp: Utc::now(),
            status: PENDING_REVIEW.to_string(),
        };
        self.reports.push(report.clone());
        report
    }

    pub fn all(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
