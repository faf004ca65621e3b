use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::activity_logs::handlers;
use crate::features::activity_logs::services::ActivityLogger;

/// Create routes for the activity log feature
pub fn routes(logger: Arc<ActivityLogger>) -> Router {
    Router::new()
        .route(
            "/api/reports/{id}/activity",
            get(handlers::list_report_activity),
        )
        .with_state(logger)
}
