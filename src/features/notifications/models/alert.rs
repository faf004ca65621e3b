use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::geo::GeoPoint;

/// Report fields carried by an urgent fan-out
#[derive(Debug, Clone)]
pub struct UrgentReportAlert {
    pub report_id: Uuid,
    pub title: String,
    pub category: String,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrafficAlert {
    pub route: String,
    pub status: String,
    pub delay: String,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "low"),
            AlertSeverity::Medium => write!(f, "medium"),
            AlertSeverity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeatherAlert {
    pub severity: AlertSeverity,
    pub description: String,
}
