//! HTTP push gateway client
//!
//! Gateway API:
//! - `POST /v1/messages/multicast` with `{tokens, notification, data}`,
//!   answers `{success_count, failure_count}`
//! - `POST /v1/topics/{topic}/messages` with `{notification, data}`,
//!   answers `{message_id}`
//! - `POST` / `DELETE /v1/topics/{topic}/subscriptions` with `{tokens}`

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::{MulticastReceipt, PushError, PushMessage, PushTransport};
use crate::core::config::PushConfig;
use crate::core::error::AppError;

#[derive(Serialize)]
struct Notification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct MulticastRequest<'a> {
    tokens: &'a [String],
    notification: Notification<'a>,
    data: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct TopicMessageRequest<'a> {
    notification: Notification<'a>,
    data: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct SubscriptionRequest<'a> {
    tokens: &'a [String],
}

#[derive(Deserialize)]
struct MulticastResponse {
    success_count: usize,
    failure_count: usize,
}

#[derive(Deserialize)]
struct TopicMessageResponse {
    message_id: String,
}

/// Push transport backed by an HTTP gateway
pub struct HttpPushTransport {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpPushTransport {
    pub fn new(base_url: String, config: &PushConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("CivicPulseCore/1.0 (push-dispatch)")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn topic_path(topic: &str, suffix: &str) -> String {
        format!("/v1/topics/{}/{}", urlencoding::encode(topic), suffix)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, PushError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Push gateway request failed: {:?}", e);
            PushError::Request(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!("Push gateway returned {}: {}", status, message);
            return Err(PushError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    async fn send_to_tokens(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<MulticastReceipt, PushError> {
        let body = MulticastRequest {
            tokens,
            notification: Notification {
                title: &message.title,
                body: &message.body,
            },
            data: &message.data,
        };

        let response = self
            .execute(self.request(Method::POST, "/v1/messages/multicast").json(&body))
            .await?;

        let parsed: MulticastResponse = response
            .json()
            .await
            .map_err(|e| PushError::InvalidResponse(e.to_string()))?;

        Ok(MulticastReceipt {
            success_count: parsed.success_count,
            failure_count: parsed.failure_count,
        })
    }

    async fn send_to_topic(&self, topic: &str, message: &PushMessage) -> Result<String, PushError> {
        let body = TopicMessageRequest {
            notification: Notification {
                title: &message.title,
                body: &message.body,
            },
            data: &message.data,
        };

        let response = self
            .execute(
                self.request(Method::POST, &Self::topic_path(topic, "messages"))
                    .json(&body),
            )
            .await?;

        let parsed: TopicMessageResponse = response
            .json()
            .await
            .map_err(|e| PushError::InvalidResponse(e.to_string()))?;

        tracing::debug!("Push sent to topic {}: {}", topic, parsed.message_id);
        Ok(parsed.message_id)
    }

    async fn subscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError> {
        self.execute(
            self.request(Method::POST, &Self::topic_path(topic, "subscriptions"))
                .json(&SubscriptionRequest { tokens }),
        )
        .await?;
        Ok(())
    }

    async fn unsubscribe(&self, tokens: &[String], topic: &str) -> Result<(), PushError> {
        self.execute(
            self.request(Method::DELETE, &Self::topic_path(topic, "subscriptions"))
                .json(&SubscriptionRequest { tokens }),
        )
        .await?;
        Ok(())
    }
}
