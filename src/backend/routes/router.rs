/**
 * Router Configuration
 *
 * Assembles the report routes and the HTTP middleware stack into a single
 * Axum router.
 *
 * # Middleware
 *
 * - CORS: any origin may submit and list reports
 * - Tracing: one span per request
 * - Body limit: 10 MiB, since reports carry base64 images
 */

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::reports::handlers::{
    handle_create_report, handle_health, handle_list_reports, handle_reports_html,
};
use crate::backend::server::state::AppState;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the Axum router with all routes configured
///
/// - `GET /` - Health probe
/// - `GET /reports` - List reports
/// - `POST /reports` - Create a report
/// - `GET /reports/html` - HTML report table
///
/// Unknown routes answer 404.
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/", get(handle_health))
        .route("/reports", get(handle_list_reports).post(handle_create_report))
        .route("/reports/html", get(handle_reports_html))
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
