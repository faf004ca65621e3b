use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::ActivityLogRepository;
use crate::core::error::{AppError, Result};
use crate::features::activity_logs::models::{ActivityAction, ActivityLogEntry, CreateActivityLog};

#[derive(Debug, FromRow)]
struct ActivityLogRow {
    id: Uuid,
    report_id: Uuid,
    action: ActivityAction,
    metadata: serde_json::Value,
    created_by: String,
    timestamp: DateTime<Utc>,
}

impl From<ActivityLogRow> for ActivityLogEntry {
    fn from(r: ActivityLogRow) -> Self {
        Self {
            id: r.id,
            report_id: r.report_id,
            action: r.action,
            metadata: r.metadata,
            created_by: r.created_by,
            timestamp: r.timestamp,
        }
    }
}

/// Postgres-backed activity log repository
pub struct PgActivityLogRepository {
    pool: PgPool,
}

impl PgActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogRepository for PgActivityLogRepository {
    async fn append(&self, data: &CreateActivityLog) -> Result<ActivityLogEntry> {
        let row = sqlx::query_as::<_, ActivityLogRow>(
            r#"
            INSERT INTO report_activity_logs (id, report_id, action, metadata, created_by, timestamp)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, report_id, action, metadata, created_by, timestamp
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.report_id)
        .bind(data.action)
        .bind(&data.metadata)
        .bind(&data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append activity log: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn list_for_report(&self, report_id: Uuid) -> Result<Vec<ActivityLogEntry>> {
        let rows = sqlx::query_as::<_, ActivityLogRow>(
            r#"
            SELECT id, report_id, action, metadata, created_by, timestamp
            FROM report_activity_logs
            WHERE report_id = $1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list activity logs: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(ActivityLogEntry::from).collect())
    }
}
