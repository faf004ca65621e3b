use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::core::middleware::internal_token_middleware;
use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::{ReportPipeline, ReportService};

/// Create public routes for the reports feature
pub fn routes(report_service: Arc<ReportService>, pipeline: Arc<ReportPipeline>) -> Router {
    let state = ReportState {
        report_service,
        pipeline,
    };

    Router::new()
        .route(
            "/api/reports",
            post(handlers::submit_report).get(handlers::list_recent_reports),
        )
        .route("/api/reports/nearby", get(handlers::list_nearby_reports))
        .route("/api/reports/{id}", get(handlers::get_report))
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .route(
            "/api/users/{user_id}/reports",
            get(handlers::list_user_reports),
        )
        .with_state(state)
}

/// Create internal trigger routes, guarded by the shared internal token
pub fn internal_routes(
    report_service: Arc<ReportService>,
    pipeline: Arc<ReportPipeline>,
    internal_token: String,
) -> Router {
    let state = ReportState {
        report_service,
        pipeline,
    };

    Router::new()
        .route(
            "/api/internal/reports/{id}/process",
            post(handlers::process_report),
        )
        .route(
            "/api/internal/reports/stale",
            get(handlers::list_stale_reports),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::new(internal_token),
            internal_token_middleware,
        ))
        .with_state(state)
}
