use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::activity_logs::models::{ActivityAction, ActivityLogEntry};

/// Response DTO for an activity log entry
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityLogResponseDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub action: ActivityAction,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_by: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ActivityLogEntry> for ActivityLogResponseDto {
    fn from(e: ActivityLogEntry) -> Self {
        Self {
            id: e.id,
            report_id: e.report_id,
            action: e.action,
            metadata: e.metadata,
            created_by: e.created_by,
            timestamp: e.timestamp,
        }
    }
}
