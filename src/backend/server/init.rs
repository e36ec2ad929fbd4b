/**
 * Server Initialization
 *
 * Builds the Axum application: fresh report state plus the router.
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application with empty state
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing report server");
    create_app_with_state(AppState::new())
}

/// Create the application around existing state
///
/// Lets callers inspect the stored reports, e.g. in tests.
pub fn create_app_with_state(app_state: AppState) -> Router<()> {
    let app = create_router(app_state);
    tracing::info!("Router configured");
    app
}
