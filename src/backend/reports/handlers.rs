/**
 * Report Handlers
 *
 * HTTP handlers for the report endpoints.
 *
 * - `GET /` - health probe used by clients to detect reachability
 * - `POST /reports` - store a report, answer 201 with the stored record
 * - `GET /reports` - all stored reports as JSON
 * - `GET /reports/html` - all stored reports as an HTML table
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    Json,
};

use crate::backend::error::BackendError;
use crate::backend::reports::html::render_reports;
use crate::backend::server::state::AppState;
use crate::shared::{Report, ReportPayload};

/// Health probe
pub async fn handle_health() -> &'static str {
    "Report server is running"
}

/// Store a new report
pub async fn handle_create_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Report>), BackendError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let report = state.reports.write().await.insert(payload);
    tracing::info!(
        id = %report.id,
        category = %report.payload.category,
        "Report received: {}",
        report.payload.title
    );

    Ok((StatusCode::CREATED, Json(report)))
}

/// List all reports
pub async fn handle_list_reports(State(state): State<AppState>) -> Json<Vec<Report>> {
    let reports = state.reports.read().await;
    Json(reports.all().to_vec())
}

/// Render all reports as HTML
pub async fn handle_reports_html(State(state): State<AppState>) -> Html<String> {
    let reports = state.reports.read().await;
    Html(render_reports(reports.all()))
}
