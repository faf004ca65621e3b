use std::collections::HashMap;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GeoBounds, ReportRepository};
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    CreateReport, DepartmentAssignment, ProcessedReport, Report, ReportStatus, StatusChange,
};

/// Process-local report repository, used when no database is configured
#[derive(Default)]
pub struct InMemoryReportRepository {
    reports: RwLock<HashMap<Uuid, Report>>,
    #[cfg(test)]
    faults: Faults,
}

#[cfg(test)]
#[derive(Default)]
struct Faults {
    processing: AtomicBool,
    assignment: AtomicBool,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut reports: Vec<Report>, limit: usize) -> Vec<Report> {
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(limit);
        reports
    }

    /// Make `save_processing` fail until cleared
    #[cfg(test)]
    pub fn fail_processing(&self, fail: bool) {
        self.faults.processing.store(fail, Ordering::SeqCst);
    }

    /// Make `assign_department` fail until cleared
    #[cfg(test)]
    pub fn fail_assignment(&self, fail: bool) {
        self.faults.assignment.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::Internal(format!("simulated {} fault", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create(&self, data: &CreateReport) -> Result<Report> {
        let report = Report {
            id: data.id,
            user_id: data.user_id.clone(),
            title: data.title.clone(),
            description: data.description.clone(),
            category: data.category,
            location: data.location,
            media_urls: data.media_urls.clone(),
            status: ReportStatus::Pending,
            priority: None,
            assigned_department: None,
            estimated_resolution_hours: None,
            analysis: None,
            location_data: None,
            created_at: data.created_at,
            processed_at: None,
            assigned_at: None,
            updated_at: data.created_at,
            last_updated_by: None,
        };

        let mut reports = self.reports.write().await;
        if reports.contains_key(&report.id) {
            return Err(AppError::Conflict(format!(
                "Report {} already exists",
                report.id
            )));
        }
        reports.insert(report.id, report.clone());

        Ok(report)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self.reports.read().await.get(&id).cloned())
    }

    async fn save_processing(&self, id: Uuid, data: &ProcessedReport) -> Result<()> {
        #[cfg(test)]
        Self::check(&self.faults.processing, "processing write")?;

        let mut reports = self.reports.write().await;
        let report = reports
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        report.analysis = Some(data.analysis.clone());
        report.location_data = Some(data.location_data.clone());
        report.priority = Some(data.priority);
        report.estimated_resolution_hours = Some(data.estimated_resolution_hours);
        report.processed_at = Some(data.processed_at);
        report.assigned_department = None;
        report.assigned_at = None;
        report.updated_at = data.processed_at;

        Ok(())
    }

    async fn assign_department(&self, id: Uuid, assignment: &DepartmentAssignment) -> Result<()> {
        #[cfg(test)]
        Self::check(&self.faults.assignment, "assignment write")?;

        let mut reports = self.reports.write().await;
        let report = reports
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        report.assigned_department = Some(assignment.department);
        report.assigned_at = Some(assignment.assigned_at);
        report.updated_at = assignment.assigned_at;

        Ok(())
    }

    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Report> {
        let mut reports = self.reports.write().await;
        let report = reports
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        if report.status != change.from_status || !report.status.can_transition_to(change.status) {
            return Err(AppError::Conflict(format!(
                "Cannot change report status from {} to {}",
                report.status, change.status
            )));
        }

        report.status = change.status;
        report.last_updated_by = Some(change.updated_by.clone());
        report.updated_at = change.updated_at;

        Ok(report.clone())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Report>> {
        let all = self.reports.read().await.values().cloned().collect();
        Ok(Self::newest_first(all, limit))
    }

    async fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<Report>> {
        let matching = self
            .reports
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(matching, limit))
    }

    async fn list_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>> {
        let mut older: Vec<Report> = self
            .reports
            .read()
            .await
            .values()
            .filter(|r| r.created_at < cutoff)
            .cloned()
            .collect();
        older.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(older)
    }

    async fn list_within_bounds(&self, bounds: GeoBounds) -> Result<Vec<Report>> {
        Ok(self
            .reports
            .read()
            .await
            .values()
            .filter(|r| bounds.contains(r.location.latitude, r.location.longitude))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::ReportCategory;
    use crate::shared::geo::GeoPoint;
    use chrono::Duration;

    fn create_report(user_id: &str, created_at: DateTime<Utc>) -> CreateReport {
        CreateReport {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            title: "Broken streetlight".to_string(),
            description: "The light on the corner has been out for a week".to_string(),
            category: ReportCategory::Utilities,
            location: GeoPoint::new(12.97, 77.59),
            media_urls: vec![],
            created_at,
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending_and_untriaged() {
        let repo = InMemoryReportRepository::new();
        let report = repo.create(&create_report("u1", Utc::now())).await.unwrap();

        assert_eq!(report.status, ReportStatus::Pending);
        assert!(report.priority.is_none());
        assert!(report.assigned_department.is_none());
    }

    #[tokio::test]
    async fn test_list_by_user_and_older_than() {
        let repo = InMemoryReportRepository::new();
        let now = Utc::now();
        repo.create(&create_report("u1", now - Duration::days(40)))
            .await
            .unwrap();
        repo.create(&create_report("u1", now)).await.unwrap();
        repo.create(&create_report("u2", now)).await.unwrap();

        let mine = repo.list_by_user("u1", 10).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].created_at >= mine[1].created_at);

        let old = repo
            .list_older_than(now - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].user_id, "u1");
    }

    #[tokio::test]
    async fn test_update_missing_report_is_not_found() {
        let repo = InMemoryReportRepository::new();
        let change = StatusChange {
            from_status: ReportStatus::Pending,
            status: ReportStatus::Resolved,
            updated_by: "crew-7".to_string(),
            updated_at: Utc::now(),
        };

        let result = repo.update_status(Uuid::now_v7(), &change).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_requires_expected_current_status() {
        let repo = InMemoryReportRepository::new();
        let report = repo.create(&create_report("u1", Utc::now())).await.unwrap();
        let change = |status| StatusChange {
            from_status: ReportStatus::Pending,
            status,
            updated_by: "crew-7".to_string(),
            updated_at: Utc::now(),
        };

        repo.update_status(report.id, &change(ReportStatus::Resolved))
            .await
            .unwrap();
        let result = repo
            .update_status(report.id, &change(ReportStatus::InProgress))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        let stored = repo.get_by_id(report.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReportStatus::Resolved);
    }
}
