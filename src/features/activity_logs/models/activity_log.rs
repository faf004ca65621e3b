use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;

/// Activity action enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "activity_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Assigned,
    Error,
    StatusUpdated,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::Created => write!(f, "created"),
            ActivityAction::Assigned => write!(f, "assigned"),
            ActivityAction::Error => write!(f, "error"),
            ActivityAction::StatusUpdated => write!(f, "status_updated"),
        }
    }
}

/// A single audit trail entry
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub report_id: Uuid,
    pub action: ActivityAction,
    pub metadata: serde_json::Value,
    pub created_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Data for appending an entry
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub report_id: Uuid,
    pub action: ActivityAction,
    pub metadata: serde_json::Value,
    pub created_by: String,
}
