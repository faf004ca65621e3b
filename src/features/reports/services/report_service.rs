use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity_logs::models::ActivityAction;
use crate::features::activity_logs::ActivityLogger;
use crate::features::reports::dtos::UpdateReportStatusDto;
use crate::features::reports::models::{CreateReport, Report, ReportSubmission, StatusChange};
use crate::features::reports::repositories::{GeoBounds, ReportRepository};
use crate::features::reports::services::validate_submission;
use crate::features::reports::workers::{ReportCreated, ReportEventPublisher};
use crate::shared::clock::Clock;
use crate::shared::geo::GeoPoint;

/// Kilometers per degree of latitude
const KM_PER_DEGREE: f64 = 111.32;

/// A report together with its distance from the query point
#[derive(Debug, Clone)]
pub struct NearbyReport {
    pub report: Report,
    pub distance_km: f64,
}

/// Service for report intake and queries
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    activity: Arc<ActivityLogger>,
    events: ReportEventPublisher,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        activity: Arc<ActivityLogger>,
        events: ReportEventPublisher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reports,
            activity,
            events,
            clock,
        }
    }

    /// Store a new report in `pending` state and queue it for triage.
    ///
    /// Priority and department are never taken from the submission.
    pub async fn submit(&self, submission: &ReportSubmission) -> Result<Report> {
        let validated = validate_submission(submission).map_err(AppError::InvalidInput)?;

        let data = CreateReport {
            id: Uuid::now_v7(),
            user_id: validated.user_id,
            title: validated.title,
            description: validated.description,
            category: validated.category,
            location: validated.location,
            media_urls: validated.media_urls,
            created_at: self.clock.now(),
        };

        let report = self.reports.create(&data).await?;

        tracing::info!(
            "Created report {} (category={}) for user {}",
            report.id,
            report.category,
            report.user_id
        );

        self.events
            .publish(ReportCreated {
                report_id: report.id,
                submission: report.to_submission(),
            })
            .await?;

        Ok(report)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        self.reports
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Report>> {
        self.reports.list_recent(limit).await
    }

    pub async fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<Report>> {
        self.reports.list_by_user(user_id, limit).await
    }

    /// Reports within `radius_km` of `center`, nearest first
    pub async fn list_nearby(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyReport>> {
        if !(-90.0..=90.0).contains(&center.latitude)
            || !(-180.0..=180.0).contains(&center.longitude)
        {
            return Err(AppError::BadRequest(
                "Invalid location coordinates".to_string(),
            ));
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(AppError::BadRequest(
                "Radius must be a positive number of kilometers".to_string(),
            ));
        }

        let candidates = self
            .reports
            .list_within_bounds(bounding_box(center, radius_km))
            .await?;

        let mut nearby: Vec<NearbyReport> = candidates
            .into_iter()
            .map(|report| NearbyReport {
                distance_km: center.distance_km(&report.location),
                report,
            })
            .filter(|n| n.distance_km <= radius_km)
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby.truncate(limit);
        Ok(nearby)
    }

    /// Move a report forward through its lifecycle and audit the change
    pub async fn update_status(&self, id: Uuid, dto: &UpdateReportStatusDto) -> Result<Report> {
        let current = self.get_by_id(id).await?;

        if !current.status.can_transition_to(dto.status) {
            return Err(AppError::Conflict(format!(
                "Cannot change report status from {} to {}",
                current.status, dto.status
            )));
        }

        let change = StatusChange {
            from_status: current.status,
            status: dto.status,
            updated_by: dto.updated_by.clone(),
            updated_at: self.clock.now(),
        };
        let report = self.reports.update_status(id, &change).await?;

        self.activity
            .record_as(
                id,
                ActivityAction::StatusUpdated,
                json!({
                    "message": format!("Status changed from {} to {}", current.status, dto.status),
                    "oldStatus": current.status,
                    "newStatus": dto.status,
                    "comments": dto.comments,
                }),
                &dto.updated_by,
            )
            .await;

        tracing::info!(
            "Report {} status {} -> {} by {}",
            id,
            current.status,
            dto.status,
            dto.updated_by
        );

        Ok(report)
    }

    /// Reports created before `cutoff`, for retention jobs
    pub async fn list_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>> {
        self.reports.list_older_than(cutoff).await
    }
}

/// Lat/lon box enclosing the circle of `radius_km` around `center`.
///
/// Near the poles or across the antimeridian the box spans every longitude.
fn bounding_box(center: GeoPoint, radius_km: f64) -> GeoBounds {
    let delta_lat = radius_km / KM_PER_DEGREE;
    let min_lat = (center.latitude - delta_lat).max(-90.0);
    let max_lat = (center.latitude + delta_lat).min(90.0);

    let cos_lat = center.latitude.to_radians().cos();
    let (min_lon, max_lon) = if min_lat <= -90.0 || max_lat >= 90.0 || cos_lat <= f64::EPSILON {
        (-180.0, 180.0)
    } else {
        let delta_lon = radius_km / (KM_PER_DEGREE * cos_lat);
        let (min_lon, max_lon) = (center.longitude - delta_lon, center.longitude + delta_lon);
        if min_lon < -180.0 || max_lon > 180.0 {
            (-180.0, 180.0)
        } else {
            (min_lon, max_lon)
        }
    };

    GeoBounds {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::activity_logs::InMemoryActivityLogRepository;
    use crate::features::reports::models::{
        DepartmentAssignment, ProcessedReport, ReportStatus, SubmittedLocation,
    };
    use crate::features::reports::repositories::InMemoryReportRepository;
    use crate::features::reports::workers::report_events;
    use crate::shared::clock::FixedClock;
    use crate::shared::test_helpers::TestContext;
    use async_trait::async_trait;
    use tokio_test::assert_ok;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn submission_at(latitude: f64, longitude: f64) -> ReportSubmission {
        let description: String = Sentence(4..8).fake();
        ReportSubmission {
            user_id: Some("citizen-3".to_string()),
            title: Some("Overflowing bin".to_string()),
            description: Some(format!("Bin overflowing. {}", description)),
            category: Some("sanitation".to_string()),
            location: Some(SubmittedLocation {
                latitude: Some(latitude),
                longitude: Some(longitude),
            }),
            media_urls: vec![],
        }
    }

    fn status_dto(status: ReportStatus) -> UpdateReportStatusDto {
        UpdateReportStatusDto {
            status,
            updated_by: "officer-12".to_string(),
            comments: Some("Crew dispatched".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_stores_pending_report_and_queues_event() {
        let ctx = TestContext::at_hour(10);

        let report = ctx.service.submit(&submission_at(40.0, -74.0)).await.unwrap();

        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.priority, None);
        assert_eq!(report.assigned_department, None);
        let event = ctx.next_event().await.unwrap();
        assert_eq!(event.report_id, report.id);
        assert_eq!(event.submission.category.as_deref(), Some("Sanitation"));
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_input() {
        let ctx = TestContext::at_hour(10);
        let mut input = submission_at(40.0, -74.0);
        input.title = Some("ab".to_string());

        let err = ctx.service.submit(&input).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(ref e) if e.len() == 1));
        assert!(ctx.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_list_nearby_filters_and_sorts_by_distance() {
        let ctx = TestContext::at_hour(10);
        let far = ctx.service.submit(&submission_at(40.10, -74.0)).await.unwrap();
        let near = ctx.service.submit(&submission_at(40.01, -74.0)).await.unwrap();
        let here = ctx.service.submit(&submission_at(40.0, -74.0)).await.unwrap();
        ctx.service.submit(&submission_at(41.0, -74.0)).await.unwrap();

        let nearby = ctx
            .service
            .list_nearby(GeoPoint::new(40.0, -74.0), 15.0, 10)
            .await
            .unwrap();

        let ids: Vec<Uuid> = nearby.iter().map(|n| n.report.id).collect();
        assert_eq!(ids, vec![here.id, near.id, far.id]);
        assert!(nearby[0].distance_km < 0.001);
        assert!(nearby[2].distance_km < 15.0);
    }

    #[tokio::test]
    async fn test_list_nearby_rejects_bad_radius() {
        let ctx = TestContext::at_hour(10);

        let err = ctx
            .service
            .list_nearby(GeoPoint::new(40.0, -74.0), 0.0, 10)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_status_moves_forward_and_is_audited() {
        let ctx = TestContext::at_hour(10);
        let report = ctx.service.submit(&submission_at(40.0, -74.0)).await.unwrap();

        let updated = ctx
            .service
            .update_status(report.id, &status_dto(ReportStatus::InProgress))
            .await
            .unwrap();

        assert_eq!(updated.status, ReportStatus::InProgress);
        assert_eq!(updated.last_updated_by.as_deref(), Some("officer-12"));
        let entries = ctx.activity.list_for_report(report.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::StatusUpdated);
        assert_eq!(entries[0].created_by, "officer-12");
        assert_eq!(entries[0].metadata["oldStatus"], "pending");
        assert_eq!(entries[0].metadata["newStatus"], "in_progress");
        assert_eq!(entries[0].metadata["comments"], "Crew dispatched");
    }

    #[tokio::test]
    async fn test_update_status_refuses_to_move_backwards() {
        let ctx = TestContext::at_hour(10);
        let report = ctx.service.submit(&submission_at(40.0, -74.0)).await.unwrap();
        ctx.service
            .update_status(report.id, &status_dto(ReportStatus::Resolved))
            .await
            .unwrap();

        let err = ctx
            .service
            .update_status(report.id, &status_dto(ReportStatus::InProgress))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    /// Yields after every read so concurrent updates interleave between read and write
    struct YieldingRepository {
        inner: InMemoryReportRepository,
    }

    #[async_trait]
    impl ReportRepository for YieldingRepository {
        async fn create(&self, data: &CreateReport) -> Result<Report> {
            self.inner.create(data).await
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<Report>> {
            let report = self.inner.get_by_id(id).await;
            tokio::task::yield_now().await;
            report
        }

        async fn save_processing(&self, id: Uuid, data: &ProcessedReport) -> Result<()> {
            self.inner.save_processing(id, data).await
        }

        async fn assign_department(
            &self,
            id: Uuid,
            assignment: &DepartmentAssignment,
        ) -> Result<()> {
            self.inner.assign_department(id, assignment).await
        }

        async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Report> {
            self.inner.update_status(id, change).await
        }

        async fn list_recent(&self, limit: usize) -> Result<Vec<Report>> {
            self.inner.list_recent(limit).await
        }

        async fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<Report>> {
            self.inner.list_by_user(user_id, limit).await
        }

        async fn list_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Report>> {
            self.inner.list_older_than(cutoff).await
        }

        async fn list_within_bounds(&self, bounds: GeoBounds) -> Result<Vec<Report>> {
            self.inner.list_within_bounds(bounds).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_status_updates_never_move_backwards() {
        let activity = Arc::new(ActivityLogger::new(Arc::new(
            InMemoryActivityLogRepository::new(),
        )));
        let (publisher, _events) = report_events(8);
        let service = ReportService::new(
            Arc::new(YieldingRepository {
                inner: InMemoryReportRepository::new(),
            }),
            activity.clone(),
            publisher,
            Arc::new(FixedClock { hour: 10 }),
        );
        let report = service.submit(&submission_at(40.0, -74.0)).await.unwrap();

        let resolve = status_dto(ReportStatus::Resolved);
        let start = status_dto(ReportStatus::InProgress);
        let (resolved, started) = tokio::join!(
            service.update_status(report.id, &resolve),
            service.update_status(report.id, &start),
        );

        assert_ok!(resolved);
        assert!(matches!(started, Err(AppError::Conflict(_))));
        let stored = service.get_by_id(report.id).await.unwrap();
        assert_eq!(stored.status, ReportStatus::Resolved);
        let entries = activity.list_for_report(report.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].metadata["oldStatus"], "pending");
        assert_eq!(entries[0].metadata["newStatus"], "resolved");
    }

    #[tokio::test]
    async fn test_list_older_than_returns_reports_before_cutoff() {
        let ctx = TestContext::at_hour(10);
        let report = ctx.service.submit(&submission_at(40.0, -74.0)).await.unwrap();

        let none = ctx
            .service
            .list_older_than(report.created_at - chrono::Duration::days(1))
            .await
            .unwrap();
        let some = ctx
            .service
            .list_older_than(report.created_at + chrono::Duration::seconds(1))
            .await
            .unwrap();

        assert!(none.is_empty());
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].id, report.id);
    }

    #[tokio::test]
    async fn test_get_unknown_report_is_not_found() {
        let ctx = TestContext::at_hour(10);

        let err = ctx.service.get_by_id(Uuid::now_v7()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_bounding_box_spans_all_longitudes_near_antimeridian() {
        let bounds = bounding_box(GeoPoint::new(0.0, 179.99), 10.0);
        assert_eq!((bounds.min_lon, bounds.max_lon), (-180.0, 180.0));

        let bounds = bounding_box(GeoPoint::new(40.0, -74.0), 10.0);
        assert!(bounds.contains(40.05, -74.05));
        assert!(!bounds.contains(40.2, -74.0));
    }
}
