use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{
    AnalysisResult, Department, EnrichedLocation, Report, ReportCategory, ReportPriority,
    ReportStatus,
};
use crate::features::reports::services::{NearbyReport, ProcessingOutcome};
use crate::shared::constants::{DEFAULT_NEARBY_RADIUS_KM, DEFAULT_STALE_REPORT_DAYS};
use crate::shared::geo::GeoPoint;

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: GeoPoint,
    pub media_urls: Vec<String>,
    pub status: ReportStatus,
    pub priority: Option<ReportPriority>,
    pub assigned_department: Option<Department>,
    pub estimated_resolution_hours: Option<i32>,
    pub analysis: Option<AnalysisResult>,
    pub location_data: Option<EnrichedLocation>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub last_updated_by: Option<String>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            category: r.category,
            location: r.location,
            media_urls: r.media_urls,
            status: r.status,
            priority: r.priority,
            assigned_department: r.assigned_department,
            estimated_resolution_hours: r.estimated_resolution_hours,
            analysis: r.analysis,
            location_data: r.location_data,
            created_at: r.created_at,
            processed_at: r.processed_at,
            assigned_at: r.assigned_at,
            updated_at: r.updated_at,
            last_updated_by: r.last_updated_by,
        }
    }
}

/// Response DTO after submitting a report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportResponseDto {
    pub report_id: Uuid,
    pub status: ReportStatus,
}

/// Report with its distance from the query point
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbyReportDto {
    #[serde(flatten)]
    pub report: ReportResponseDto,
    pub distance_km: f64,
}

impl From<NearbyReport> for NearbyReportDto {
    fn from(n: NearbyReport) -> Self {
        Self {
            report: n.report.into(),
            distance_km: n.distance_km,
        }
    }
}

/// Request DTO for a status change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,

    /// Official or system performing the change
    #[validate(length(min = 1, max = 255, message = "updated_by must not be empty"))]
    pub updated_by: String,

    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

/// Query params for nearby reports
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NearbyQuery {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Search radius in kilometers (default: 5)
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Maximum number of items to return (max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

fn default_radius_km() -> f64 {
    DEFAULT_NEARBY_RADIUS_KM
}

/// Query params for the stale-report listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct StaleReportsQuery {
    /// Minimum report age in days (default: 30)
    #[serde(default = "default_stale_days")]
    #[param(minimum = 1)]
    pub older_than_days: u32,
}

fn default_stale_days() -> u32 {
    DEFAULT_STALE_REPORT_DAYS
}

/// Result of running triage for a stored report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessingOutcomeDto {
    pub report_id: Uuid,
    pub priority: ReportPriority,
    pub department: Department,
    pub estimated_resolution_hours: i32,
    pub urgent: bool,
}

impl From<ProcessingOutcome> for ProcessingOutcomeDto {
    fn from(o: ProcessingOutcome) -> Self {
        Self {
            report_id: o.report_id,
            priority: o.priority,
            department: o.department,
            estimated_resolution_hours: o.estimated_resolution_hours,
            urgent: o.urgent,
        }
    }
}
