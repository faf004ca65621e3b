//! Persistence contract for reports.
//!
//! Reports are addressed by their unique id and every write touches a single
//! record, so concurrent pipelines never need cross-report locking.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::reports::models::{
    CreateReport, DepartmentAssignment, ProcessedReport, Report, StatusChange,
};

pub use memory::InMemoryReportRepository;
pub use postgres::PgReportRepository;

/// Latitude/longitude box used to prefilter geo queries
#[derive(Debug, Clone, Copy)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create(&self, data: &CreateReport) -> Result<Report>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Report>>;

    /// Merge triage output into the report
    async fn save_processing(&self, id: Uuid, data: &ProcessedReport) -> Result<()>;

    async fn assign_department(&self, id: Uuid, assignment: &DepartmentAssignment) -> Result<()>;

    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Report>;

    /// Newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<Report>>;

    /// Newest first
    async fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<Report>>;

    /// Reports created before `cutoff`, for retention jobs
    async fn list_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>>;

    async fn list_within_bounds(&self, bounds: GeoBounds) -> Result<Vec<Report>>;
}
