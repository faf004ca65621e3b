use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use thiserror::Error;

use crate::core::error::AppError;
use crate::features::notifications::models::{
    AlertSeverity, BatchItem, BatchItemResult, BatchSummary, NotificationMessage,
    SubscriptionPreferences, TrafficAlert, UrgentReportAlert, WeatherAlert,
};
use crate::modules::push::{MulticastReceipt, PushError, PushTransport};
use crate::shared::constants::{
    TOPIC_ALL_USERS, TOPIC_AUTHORITIES, TOPIC_CATEGORY_PREFIX, TOPIC_TRAFFIC_UPDATES,
    TOPIC_WEATHER_UPDATES,
};
use crate::shared::geo::GeoPoint;
use crate::shared::validation::is_valid_topic;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("At least one device token is required")]
    NoTokens,

    #[error("Invalid topic name: {0}")]
    InvalidTopic(String),

    #[error("Push delivery to {target} failed: {source}")]
    Delivery {
        target: String,
        #[source]
        source: PushError,
    },

    #[error(
        "{count} of {total} deliveries failed: {summary}",
        count = .failures.len(),
        summary = .failures.join("; ")
    )]
    Partial { total: usize, failures: Vec<String> },
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NoTokens | NotificationError::InvalidTopic(_) => {
                AppError::BadRequest(e.to_string())
            }
            NotificationError::Delivery { .. } | NotificationError::Partial { .. } => {
                AppError::ExternalServiceError(e.to_string())
            }
        }
    }
}

type NotificationResult<T> = std::result::Result<T, NotificationError>;

/// Wait for every send, then fail if any one of them failed
fn settle<T>(results: Vec<NotificationResult<T>>) -> NotificationResult<Vec<T>> {
    let total = results.len();
    let mut ok = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for result in results {
        match result {
            Ok(value) => ok.push(value),
            Err(e) => failures.push(e.to_string()),
        }
    }

    if failures.is_empty() {
        Ok(ok)
    } else {
        Err(NotificationError::Partial { total, failures })
    }
}

fn location_json(point: &GeoPoint) -> String {
    json!({"latitude": point.latitude, "longitude": point.longitude}).to_string()
}

/// Sends push notifications and manages topic subscriptions
pub struct NotificationDispatcher {
    transport: Arc<dyn PushTransport>,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self { transport }
    }

    fn check_topic(topic: &str) -> NotificationResult<()> {
        if is_valid_topic(topic) {
            Ok(())
        } else {
            Err(NotificationError::InvalidTopic(topic.to_string()))
        }
    }

    pub async fn send_to_tokens(
        &self,
        tokens: &[String],
        message: &NotificationMessage,
    ) -> NotificationResult<MulticastReceipt> {
        if tokens.is_empty() {
            return Err(NotificationError::NoTokens);
        }

        let receipt = self
            .transport
            .send_to_tokens(tokens, &message.to_push())
            .await
            .map_err(|source| NotificationError::Delivery {
                target: format!("{} token(s)", tokens.len()),
                source,
            })?;

        tracing::info!(
            "Notification sent to tokens: success={}, failure={}",
            receipt.success_count,
            receipt.failure_count
        );
        Ok(receipt)
    }

    pub async fn send_to_topic(
        &self,
        topic: &str,
        message: &NotificationMessage,
    ) -> NotificationResult<String> {
        Self::check_topic(topic)?;

        let message_id = self
            .transport
            .send_to_topic(topic, &message.to_push())
            .await
            .map_err(|source| NotificationError::Delivery {
                target: format!("topic {}", topic),
                source,
            })?;

        tracing::info!("Notification sent to topic {}: {}", topic, message_id);
        Ok(message_id)
    }

    /// Alert authorities and, when the report is located, nearby users.
    ///
    /// Both sends run concurrently and all of them settle before the result
    /// is reported.
    pub async fn send_urgent_report_notification(
        &self,
        alert: &UrgentReportAlert,
    ) -> NotificationResult<Vec<String>> {
        let mut data = BTreeMap::from([
            ("type".to_string(), "urgent_report".to_string()),
            ("reportId".to_string(), alert.report_id.to_string()),
            ("category".to_string(), alert.category.clone()),
        ]);
        if let Some(point) = &alert.location {
            data.insert("location".to_string(), location_json(point));
        }

        let mut sends = vec![(
            TOPIC_AUTHORITIES.to_string(),
            NotificationMessage {
                title: "🚨 Urgent Report Alert".to_string(),
                body: format!("{}: {}", alert.category, alert.title),
                data: data.clone(),
            },
        )];

        if let Some(point) = &alert.location {
            sends.push((
                point.topic(),
                NotificationMessage {
                    title: "📍 Report Near You".to_string(),
                    body: format!("New {} report: {}", alert.category, alert.title),
                    data,
                },
            ));
        }

        let results = join_all(
            sends
                .iter()
                .map(|(topic, message)| self.send_to_topic(topic, message)),
        )
        .await;

        settle(results)
    }

    /// Subscribe a device to the topics its preferences select; always
    /// includes `all_users`. Returns the topics subscribed.
    pub async fn subscribe_to_topics(
        &self,
        token: &str,
        preferences: &SubscriptionPreferences,
    ) -> NotificationResult<Vec<String>> {
        let mut topics = vec![TOPIC_ALL_USERS.to_string()];
        topics.extend(
            preferences
                .categories
                .iter()
                .map(|c| format!("{}{}", TOPIC_CATEGORY_PREFIX, c)),
        );
        if let Some(point) = &preferences.location {
            topics.push(point.topic());
        }
        if preferences.traffic {
            topics.push(TOPIC_TRAFFIC_UPDATES.to_string());
        }
        if preferences.weather {
            topics.push(TOPIC_WEATHER_UPDATES.to_string());
        }

        self.apply_subscriptions(token, &topics, true).await?;

        tracing::info!("Device subscribed to {} topic(s)", topics.len());
        Ok(topics)
    }

    pub async fn unsubscribe_from_topics(
        &self,
        token: &str,
        topics: &[String],
    ) -> NotificationResult<()> {
        self.apply_subscriptions(token, topics, false).await?;

        tracing::info!("Device unsubscribed from {} topic(s)", topics.len());
        Ok(())
    }

    async fn apply_subscriptions(
        &self,
        token: &str,
        topics: &[String],
        subscribe: bool,
    ) -> NotificationResult<()> {
        if token.trim().is_empty() {
            return Err(NotificationError::NoTokens);
        }
        for topic in topics {
            Self::check_topic(topic)?;
        }

        let tokens = vec![token.to_string()];
        let results = join_all(topics.iter().map(|topic| {
            let tokens = &tokens;
            async move {
                let outcome = if subscribe {
                    self.transport.subscribe(tokens, topic).await
                } else {
                    self.transport.unsubscribe(tokens, topic).await
                };
                outcome.map_err(|source| NotificationError::Delivery {
                    target: format!("topic {}", topic),
                    source,
                })
            }
        }))
        .await;

        settle(results).map(|_| ())
    }

    /// Dispatch every entry concurrently; one failure never stops the rest
    pub async fn send_batch(&self, items: &[BatchItem]) -> BatchSummary {
        let outcomes = join_all(items.iter().map(|item| async move {
            match item {
                BatchItem::Token {
                    tokens,
                    notification,
                } => self.send_to_tokens(tokens, notification).await.map(|_| None),
                BatchItem::Topic {
                    topic,
                    notification,
                } => self.send_to_topic(topic, notification).await.map(Some),
            }
        }))
        .await;

        let results: Vec<BatchItemResult> = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| match outcome {
                Ok(message_id) => BatchItemResult {
                    index,
                    success: true,
                    message_id,
                    error: None,
                },
                Err(e) => BatchItemResult {
                    index,
                    success: false,
                    message_id: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        let success_count = results.iter().filter(|r| r.success).count();
        let failure_count = results.len() - success_count;

        tracing::info!(
            "Batch notifications: {} succeeded, {} failed",
            success_count,
            failure_count
        );

        BatchSummary {
            success_count,
            failure_count,
            results,
        }
    }

    pub async fn send_traffic_alert(&self, alert: &TrafficAlert) -> NotificationResult<String> {
        let mut message = NotificationMessage::new(
            "🚦 Traffic Update",
            format!("{}: {} traffic, {} delay", alert.route, alert.status, alert.delay),
        )
        .with_data("type", "traffic_alert")
        .with_data("route", alert.route.clone())
        .with_data("status", alert.status.clone())
        .with_data("delay", alert.delay.clone());
        if let Some(point) = &alert.location {
            message = message.with_data("location", location_json(point));
        }

        self.send_to_topic(TOPIC_TRAFFIC_UPDATES, &message).await
    }

    /// High severity goes to everyone, the rest to weather subscribers
    pub async fn send_weather_alert(&self, alert: &WeatherAlert) -> NotificationResult<String> {
        let message = NotificationMessage::new("🌤️ Weather Alert", alert.description.clone())
            .with_data("type", "weather_alert")
            .with_data("severity", alert.severity.to_string())
            .with_data("description", alert.description.clone());

        let topic = if alert.severity == AlertSeverity::High {
            TOPIC_ALL_USERS
        } else {
            TOPIC_WEATHER_UPDATES
        };

        self.send_to_topic(topic, &message).await
    }
}
