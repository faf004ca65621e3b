use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::notifications::dtos::{
    BatchNotificationDto, MessageIdDto, MulticastReceiptDto, SendNotificationDto, SubscribeDto,
    SubscriptionResponseDto, TrafficAlertDto, UnsubscribeDto, WeatherAlertDto,
};
use crate::features::notifications::models::BatchSummary;
use crate::features::notifications::services::NotificationDispatcher;
use crate::shared::types::ApiResponse;

/// Send a notification to explicit device tokens
#[utoipa::path(
    post,
    path = "/api/notifications/send",
    request_body = SendNotificationDto,
    responses(
        (status = 200, description = "Notification sent", body = ApiResponse<MulticastReceiptDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Push gateway error")
    ),
    tag = "notifications"
)]
pub async fn send_notification(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    AppJson(dto): AppJson<SendNotificationDto>,
) -> Result<Json<ApiResponse<MulticastReceiptDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let receipt = dispatcher.send_to_tokens(&dto.tokens, &dto.message()).await?;
    Ok(Json(ApiResponse::success(Some(receipt.into()), None, None)))
}

/// Send a batch of token and topic notifications
///
/// Every item is attempted; per-item outcomes are reported in order.
#[utoipa::path(
    post,
    path = "/api/notifications/batch",
    request_body = BatchNotificationDto,
    responses(
        (status = 200, description = "Batch dispatched", body = ApiResponse<BatchSummary>),
        (status = 400, description = "Validation error")
    ),
    tag = "notifications"
)]
pub async fn send_batch(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    AppJson(dto): AppJson<BatchNotificationDto>,
) -> Result<Json<ApiResponse<BatchSummary>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let summary = dispatcher.send_batch(&dto.items).await;
    let message = format!(
        "{} succeeded, {} failed",
        summary.success_count, summary.failure_count
    );
    Ok(Json(ApiResponse::success(Some(summary), Some(message), None)))
}

/// Subscribe a device to topics selected by its preferences
#[utoipa::path(
    post,
    path = "/api/notifications/subscriptions",
    request_body = SubscribeDto,
    responses(
        (status = 200, description = "Subscribed", body = ApiResponse<SubscriptionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Push gateway error")
    ),
    tag = "notifications"
)]
pub async fn subscribe(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    AppJson(dto): AppJson<SubscribeDto>,
) -> Result<Json<ApiResponse<SubscriptionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let topics = dispatcher
        .subscribe_to_topics(&dto.token, &dto.preferences)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(SubscriptionResponseDto { topics }),
        None,
        None,
    )))
}

/// Unsubscribe a device from the given topics
#[utoipa::path(
    delete,
    path = "/api/notifications/subscriptions",
    request_body = UnsubscribeDto,
    responses(
        (status = 200, description = "Unsubscribed", body = ApiResponse<SubscriptionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Push gateway error")
    ),
    tag = "notifications"
)]
pub async fn unsubscribe(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    AppJson(dto): AppJson<UnsubscribeDto>,
) -> Result<Json<ApiResponse<SubscriptionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    dispatcher
        .unsubscribe_from_topics(&dto.token, &dto.topics)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(SubscriptionResponseDto { topics: dto.topics }),
        None,
        None,
    )))
}

/// Broadcast a traffic alert to traffic subscribers
#[utoipa::path(
    post,
    path = "/api/notifications/alerts/traffic",
    request_body = TrafficAlertDto,
    responses(
        (status = 200, description = "Alert sent", body = ApiResponse<MessageIdDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Push gateway error")
    ),
    tag = "notifications"
)]
pub async fn send_traffic_alert(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    AppJson(dto): AppJson<TrafficAlertDto>,
) -> Result<Json<ApiResponse<MessageIdDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let message_id = dispatcher.send_traffic_alert(&dto.into()).await?;
    Ok(Json(ApiResponse::success(
        Some(MessageIdDto { message_id }),
        None,
        None,
    )))
}

/// Broadcast a weather alert; high severity reaches every user
#[utoipa::path(
    post,
    path = "/api/notifications/alerts/weather",
    request_body = WeatherAlertDto,
    responses(
        (status = 200, description = "Alert sent", body = ApiResponse<MessageIdDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Push gateway error")
    ),
    tag = "notifications"
)]
pub async fn send_weather_alert(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    AppJson(dto): AppJson<WeatherAlertDto>,
) -> Result<Json<ApiResponse<MessageIdDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let message_id = dispatcher.send_weather_alert(&dto.into()).await?;
    Ok(Json(ApiResponse::success(
        Some(MessageIdDto { message_id }),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::routes;
    use crate::modules::push::RecordingTransport;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server() -> (Arc<RecordingTransport>, TestServer) {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(transport.clone()));
        (
            transport,
            TestServer::new(routes::routes(dispatcher)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_send_counts_token_failures() {
        let (_, server) = server();

        let response = server
            .post("/api/notifications/send")
            .json(&json!({
                "tokens": ["device-1", "invalid-device", "device-2"],
                "title": "Water outage",
                "body": "Supply restored by 18:00"
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["success_count"], 2);
        assert_eq!(body["data"]["failure_count"], 1);
    }

    #[tokio::test]
    async fn test_send_without_tokens_is_rejected() {
        let (transport, server) = server();

        let response = server
            .post("/api/notifications/send")
            .json(&json!({"tokens": [], "title": "t", "body": "b"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_batch_endpoint_reports_counts() {
        let (transport, server) = server();
        transport.fail_topic("category_Safety");

        let response = server
            .post("/api/notifications/batch")
            .json(&json!({
                "items": [
                    {"kind": "topic", "topic": "all_users",
                     "notification": {"title": "Hi", "body": "There"}},
                    {"kind": "topic", "topic": "category_Safety",
                     "notification": {"title": "Hi", "body": "There"}},
                    {"kind": "token", "tokens": ["device-1"],
                     "notification": {"title": "Hi", "body": "There", "data": {"k": "v"}}}
                ]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["success_count"], 2);
        assert_eq!(body["data"]["failure_count"], 1);
        assert_eq!(body["data"]["results"][1]["success"], false);
    }

    #[tokio::test]
    async fn test_weather_alert_endpoint() {
        let (transport, server) = server();

        let response = server
            .post("/api/notifications/alerts/weather")
            .json(&json!({"severity": "high", "description": "Cyclone approaching"}))
            .await;

        response.assert_status_ok();
        assert_eq!(transport.topics(), vec!["all_users"]);
    }

    #[tokio::test]
    async fn test_unsubscribe_rejects_invalid_topic() {
        let (_, server) = server();

        let response = server
            .delete("/api/notifications/subscriptions")
            .json(&json!({"token": "device-1", "topics": ["not a topic"]}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
