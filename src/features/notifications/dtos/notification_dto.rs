use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::notifications::models::{
    AlertSeverity, BatchItem, NotificationMessage, SubscriptionPreferences, TrafficAlert,
    WeatherAlert,
};
use crate::modules::push::MulticastReceipt;
use crate::shared::geo::GeoPoint;

/// Request DTO for sending to explicit device tokens
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendNotificationDto {
    #[validate(length(min = 1, max = 500, message = "Tokens must contain 1-500 entries"))]
    pub tokens: Vec<String>,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Body must be 1-2000 characters"))]
    pub body: String,

    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl SendNotificationDto {
    pub fn message(&self) -> NotificationMessage {
        NotificationMessage {
            title: self.title.clone(),
            body: self.body.clone(),
            data: self.data.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BatchNotificationDto {
    #[validate(length(min = 1, max = 500, message = "Batch must contain 1-500 items"))]
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubscribeDto {
    #[validate(length(min = 1, message = "Device token is required"))]
    pub token: String,

    #[serde(default)]
    pub preferences: SubscriptionPreferences,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UnsubscribeDto {
    #[validate(length(min = 1, message = "Device token is required"))]
    pub token: String,

    #[validate(length(min = 1, message = "At least one topic is required"))]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TrafficAlertDto {
    #[validate(length(min = 1, max = 200, message = "Route must be 1-200 characters"))]
    pub route: String,

    #[validate(length(min = 1, max = 50, message = "Status must be 1-50 characters"))]
    pub status: String,

    #[validate(length(min = 1, max = 50, message = "Delay must be 1-50 characters"))]
    pub delay: String,

    pub location: Option<GeoPoint>,
}

impl From<TrafficAlertDto> for TrafficAlert {
    fn from(dto: TrafficAlertDto) -> Self {
        Self {
            route: dto.route,
            status: dto.status,
            delay: dto.delay,
            location: dto.location,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct WeatherAlertDto {
    pub severity: AlertSeverity,

    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,
}

impl From<WeatherAlertDto> for WeatherAlert {
    fn from(dto: WeatherAlertDto) -> Self {
        Self {
            severity: dto.severity,
            description: dto.description,
        }
    }
}

/// Response DTO for a multicast send
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MulticastReceiptDto {
    pub success_count: usize,
    pub failure_count: usize,
}

impl From<MulticastReceipt> for MulticastReceiptDto {
    fn from(r: MulticastReceipt) -> Self {
        Self {
            success_count: r.success_count,
            failure_count: r.failure_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageIdDto {
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponseDto {
    pub topics: Vec<String>,
}
