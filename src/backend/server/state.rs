/**
 * Application State Management
 *
 * This module defines the application state structure shared by all
 * request handlers.
 *
 * # Thread Safety
 *
 * `Arc<RwLock<ReportState>>` allows concurrent listing while a new report
 * is inserted under an exclusive write lock.
 *
 * # Example
 *
 * ```rust
 * use fieldreport::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) -> usize {
 *     state.reports.read().await.len()
 * }
 * ```
 */

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::reports::ReportState;

/// Application state shared across handlers
#[derive(Clone, Default)]
pub struct AppState {
    /// Accepted reports
    pub reports: Arc<RwLock<ReportState>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
