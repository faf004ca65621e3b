use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{GeoBounds, ReportRepository};
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    AnalysisResult, CreateReport, Department, DepartmentAssignment, EnrichedLocation,
    ProcessedReport, Report, ReportCategory, ReportPriority, ReportStatus, StatusChange,
};
use crate::shared::geo::GeoPoint;

const REPORT_COLUMNS: &str = r#"
    id, user_id, title, description, category, latitude, longitude, media_urls,
    status, priority, assigned_department, estimated_resolution_hours,
    analysis, location_data,
    created_at, processed_at, assigned_at, updated_at, last_updated_by
"#;

/// Database row for report
#[derive(Debug, FromRow)]
struct ReportRow {
    id: Uuid,
    user_id: String,
    title: String,
    description: String,
    category: ReportCategory,
    latitude: f64,
    longitude: f64,
    media_urls: Vec<String>,
    status: ReportStatus,
    priority: Option<ReportPriority>,
    assigned_department: Option<Department>,
    estimated_resolution_hours: Option<i32>,
    analysis: Option<Json<AnalysisResult>>,
    location_data: Option<Json<EnrichedLocation>>,
    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
    assigned_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    last_updated_by: Option<String>,
}

impl From<ReportRow> for Report {
    fn from(r: ReportRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            category: r.category,
            location: GeoPoint::new(r.latitude, r.longitude),
            media_urls: r.media_urls,
            status: r.status,
            priority: r.priority,
            assigned_department: r.assigned_department,
            estimated_resolution_hours: r.estimated_resolution_hours,
            analysis: r.analysis.map(|j| j.0),
            location_data: r.location_data.map(|j| j.0),
            created_at: r.created_at,
            processed_at: r.processed_at,
            assigned_at: r.assigned_at,
            updated_at: r.updated_at,
            last_updated_by: r.last_updated_by,
        }
    }
}

/// Postgres-backed report repository
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, data: &CreateReport) -> Result<Report> {
        let sql = format!(
            r#"
            INSERT INTO reports (
                id, user_id, title, description, category, latitude, longitude,
                media_urls, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9, $9)
            RETURNING {REPORT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(data.id)
            .bind(&data.user_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.category)
            .bind(data.location.latitude)
            .bind(data.location.longitude)
            .bind(&data.media_urls)
            .bind(data.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");

        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(row.map(Report::from))
    }

    async fn save_processing(&self, id: Uuid, data: &ProcessedReport) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET analysis = $2, location_data = $3, priority = $4,
                estimated_resolution_hours = $5, processed_at = $6,
                assigned_department = NULL, assigned_at = NULL,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(&data.analysis))
        .bind(Json(&data.location_data))
        .bind(data.priority)
        .bind(data.estimated_resolution_hours)
        .bind(data.processed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save report processing: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        Ok(())
    }

    async fn assign_department(&self, id: Uuid, assignment: &DepartmentAssignment) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET assigned_department = $2, assigned_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(assignment.department)
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to assign department: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        Ok(())
    }

    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Report> {
        let sql = format!(
            r#"
            UPDATE reports
            SET status = $2, last_updated_by = $3, updated_at = $4
            WHERE id = $1 AND status = $5
            RETURNING {REPORT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id)
            .bind(change.status)
            .bind(&change.updated_by)
            .bind(change.updated_at)
            .bind(change.from_status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report status: {:?}", e);
                AppError::Database(e)
            })?;

        match row {
            Some(row) => Ok(row.into()),
            // Either gone or moved on since it was read
            None => match self.get_by_id(id).await? {
                Some(current) => Err(AppError::Conflict(format!(
                    "Cannot change report status from {} to {}",
                    current.status, change.status
                ))),
                None => Err(AppError::NotFound(format!("Report {} not found", id))),
            },
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC LIMIT $1");

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list recent reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Report::from).collect())
    }

    async fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        );

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(user_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports by user: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Report::from).collect())
    }

    async fn list_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE created_at < $1 ORDER BY created_at ASC"
        );

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports older than cutoff: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Report::from).collect())
    }

    async fn list_within_bounds(&self, bounds: GeoBounds) -> Result<Vec<Report>> {
        let sql = format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE latitude BETWEEN $1 AND $2
            AND longitude BETWEEN $3 AND $4
            "#
        );

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(bounds.min_lat)
            .bind(bounds.max_lat)
            .bind(bounds.min_lon)
            .bind(bounds.max_lon)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports within bounds: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Report::from).collect())
    }
}
