use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::push::PushMessage;
use crate::shared::geo::GeoPoint;

/// Title, body and string data delivered to a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn to_push(&self) -> PushMessage {
        PushMessage {
            title: self.title.clone(),
            body: self.body.clone(),
            data: self.data.clone(),
        }
    }
}

/// One entry of a batch send
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchItem {
    Token {
        tokens: Vec<String>,
        notification: NotificationMessage,
    },
    Topic {
        topic: String,
        notification: NotificationMessage,
    },
}

/// Outcome of one batch entry, in request order
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<BatchItemResult>,
}

/// Topics a device wants beyond the default `all_users`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionPreferences {
    #[serde(default)]
    pub categories: Vec<String>,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub traffic: bool,
    #[serde(default)]
    pub weather: bool,
}
