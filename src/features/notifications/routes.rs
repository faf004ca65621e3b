use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::notifications::handlers;
use crate::features::notifications::services::NotificationDispatcher;

/// Create routes for the notifications feature
pub fn routes(dispatcher: Arc<NotificationDispatcher>) -> Router {
    Router::new()
        .route("/api/notifications/send", post(handlers::send_notification))
        .route("/api/notifications/batch", post(handlers::send_batch))
        .route(
            "/api/notifications/subscriptions",
            post(handlers::subscribe).delete(handlers::unsubscribe),
        )
        .route(
            "/api/notifications/alerts/traffic",
            post(handlers::send_traffic_alert),
        )
        .route(
            "/api/notifications/alerts/weather",
            post(handlers::send_weather_alert),
        )
        .with_state(dispatcher)
}
