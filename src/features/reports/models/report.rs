use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::reports::models::{AnalysisResult, EnrichedLocation, ReportSubmission};
use crate::shared::geo::GeoPoint;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ReportStatus {
    fn rank(self) -> u8 {
        match self {
            ReportStatus::Pending => 0,
            ReportStatus::InProgress => 1,
            ReportStatus::Resolved => 2,
        }
    }

    /// Status only moves forward: pending -> in_progress -> resolved
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// Report priority enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
}

impl ReportPriority {
    /// Map a triage score onto a priority bucket
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 4 => ReportPriority::High,
            s if s >= 2 => ReportPriority::Medium,
            _ => ReportPriority::Low,
        }
    }

    /// Multiplier applied to a category's base resolution time
    pub fn resolution_multiplier(self) -> f64 {
        match self {
            ReportPriority::High => 0.5,
            ReportPriority::Medium => 1.0,
            ReportPriority::Low => 2.0,
        }
    }
}

impl std::fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportPriority::Low => write!(f, "low"),
            ReportPriority::Medium => write!(f, "medium"),
            ReportPriority::High => write!(f, "high"),
        }
    }
}

/// Report category enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_category")]
pub enum ReportCategory {
    Infrastructure,
    Utilities,
    Sanitation,
    Traffic,
    Safety,
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 6] = [
        ReportCategory::Infrastructure,
        ReportCategory::Utilities,
        ReportCategory::Sanitation,
        ReportCategory::Traffic,
        ReportCategory::Safety,
        ReportCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportCategory::Infrastructure => "Infrastructure",
            ReportCategory::Utilities => "Utilities",
            ReportCategory::Sanitation => "Sanitation",
            ReportCategory::Traffic => "Traffic",
            ReportCategory::Safety => "Safety",
            ReportCategory::Other => "Other",
        }
    }

    /// Case-insensitive parse; anything unrecognised files under `Other`
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(raw))
            .unwrap_or(ReportCategory::Other)
    }

    /// Contribution of the category to the triage score
    pub fn weight(self) -> u32 {
        match self {
            ReportCategory::Safety => 3,
            ReportCategory::Infrastructure | ReportCategory::Utilities => 2,
            ReportCategory::Traffic | ReportCategory::Sanitation => 1,
            ReportCategory::Other => 0,
        }
    }

    /// Resolution time at medium priority, in hours
    pub fn base_resolution_hours(self) -> f64 {
        match self {
            ReportCategory::Safety => 24.0,
            ReportCategory::Utilities => 48.0,
            ReportCategory::Infrastructure => 168.0,
            ReportCategory::Traffic => 72.0,
            ReportCategory::Sanitation => 48.0,
            ReportCategory::Other => 120.0,
        }
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Responsible department enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_department", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Department {
    PublicWorks,
    UtilitiesDept,
    SanitationDept,
    TrafficDept,
    PoliceDept,
    GeneralAdmin,
}

impl Department {
    /// Department responsible for a category; total over all inputs
    pub fn for_category(category: Option<ReportCategory>) -> Self {
        match category {
            Some(ReportCategory::Infrastructure) => Department::PublicWorks,
            Some(ReportCategory::Utilities) => Department::UtilitiesDept,
            Some(ReportCategory::Sanitation) => Department::SanitationDept,
            Some(ReportCategory::Traffic) => Department::TrafficDept,
            Some(ReportCategory::Safety) => Department::PoliceDept,
            Some(ReportCategory::Other) | None => Department::GeneralAdmin,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Department::PublicWorks => "public_works",
            Department::UtilitiesDept => "utilities_dept",
            Department::SanitationDept => "sanitation_dept",
            Department::TrafficDept => "traffic_dept",
            Department::PoliceDept => "police_dept",
            Department::GeneralAdmin => "general_admin",
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citizen report as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
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

impl Report {
    /// Raw fields as they would have been submitted, for re-running triage
    pub fn to_submission(&self) -> ReportSubmission {
        ReportSubmission {
            user_id: Some(self.user_id.clone()),
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            category: Some(self.category.as_str().to_string()),
            location: Some(self.location.into()),
            media_urls: self.media_urls.clone(),
        }
    }
}

/// Data for creating a new report. Priority and department are never part of
/// intake; only the pipeline sets them.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: GeoPoint,
    pub media_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Triage output merged into a report by the pipeline
#[derive(Debug, Clone)]
pub struct ProcessedReport {
    pub analysis: AnalysisResult,
    pub location_data: EnrichedLocation,
    pub priority: ReportPriority,
    pub estimated_resolution_hours: i32,
    pub processed_at: DateTime<Utc>,
}

/// Department assignment written by the router
#[derive(Debug, Clone, Copy)]
pub struct DepartmentAssignment {
    pub department: Department,
    pub assigned_at: DateTime<Utc>,
}

/// Status change requested by an external actor.
///
/// Only applied while the report is still in `from_status`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub from_status: ReportStatus,
    pub status: ReportStatus,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Estimated hours until resolution for a category at a given priority
pub fn estimate_resolution_hours(priority: ReportPriority, category: ReportCategory) -> i32 {
    (category.base_resolution_hours() * priority.resolution_multiplier()).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_mapping_is_total() {
        let expected = [
            (ReportCategory::Infrastructure, "public_works"),
            (ReportCategory::Utilities, "utilities_dept"),
            (ReportCategory::Sanitation, "sanitation_dept"),
            (ReportCategory::Traffic, "traffic_dept"),
            (ReportCategory::Safety, "police_dept"),
            (ReportCategory::Other, "general_admin"),
        ];
        for (category, department) in expected {
            assert_eq!(Department::for_category(Some(category)).as_str(), department);
        }
        assert_eq!(Department::for_category(None), Department::GeneralAdmin);
        assert_eq!(
            Department::for_category(Some(ReportCategory::parse_lenient("Parks"))),
            Department::GeneralAdmin
        );
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(ReportCategory::parse_lenient("safety"), ReportCategory::Safety);
        assert_eq!(
            ReportCategory::parse_lenient(" Infrastructure "),
            ReportCategory::Infrastructure
        );
        assert_eq!(ReportCategory::parse_lenient("potholes"), ReportCategory::Other);
    }

    #[test]
    fn test_priority_from_score() {
        assert_eq!(ReportPriority::from_score(0), ReportPriority::Low);
        assert_eq!(ReportPriority::from_score(1), ReportPriority::Low);
        assert_eq!(ReportPriority::from_score(2), ReportPriority::Medium);
        assert_eq!(ReportPriority::from_score(3), ReportPriority::Medium);
        assert_eq!(ReportPriority::from_score(4), ReportPriority::High);
        assert_eq!(ReportPriority::from_score(6), ReportPriority::High);
    }

    #[test]
    fn test_estimate_resolution_hours() {
        assert_eq!(
            estimate_resolution_hours(ReportPriority::High, ReportCategory::Safety),
            12
        );
        assert_eq!(
            estimate_resolution_hours(ReportPriority::Medium, ReportCategory::Infrastructure),
            168
        );
        assert_eq!(
            estimate_resolution_hours(ReportPriority::Low, ReportCategory::Other),
            240
        );
    }

    #[test]
    fn test_status_only_moves_forward() {
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::InProgress));
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Resolved));
        assert!(ReportStatus::InProgress.can_transition_to(ReportStatus::Resolved));
        assert!(!ReportStatus::Resolved.can_transition_to(ReportStatus::Pending));
        assert!(!ReportStatus::InProgress.can_transition_to(ReportStatus::InProgress));
    }
}
