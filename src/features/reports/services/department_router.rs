use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::activity_logs::models::ActivityAction;
use crate::features::activity_logs::ActivityLogger;
use crate::features::reports::models::{Department, DepartmentAssignment, ReportCategory};
use crate::features::reports::repositories::ReportRepository;
use crate::shared::clock::Clock;

/// Assigns a report to the department responsible for its category
pub struct DepartmentRouter {
    reports: Arc<dyn ReportRepository>,
    activity: Arc<ActivityLogger>,
    clock: Arc<dyn Clock>,
}

impl DepartmentRouter {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        activity: Arc<ActivityLogger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reports,
            activity,
            clock,
        }
    }

    /// Persist the assignment, then record it in the audit trail.
    ///
    /// A persistence fault is returned to the caller and nothing is logged.
    pub async fn assign(&self, report_id: Uuid, category: ReportCategory) -> Result<Department> {
        let department = Department::for_category(Some(category));
        let assignment = DepartmentAssignment {
            department,
            assigned_at: self.clock.now(),
        };

        self.reports
            .assign_department(report_id, &assignment)
            .await?;

        tracing::info!("Report {} assigned to {}", report_id, department);

        self.activity
            .record(
                report_id,
                ActivityAction::Assigned,
                json!({
                    "message": format!("Report assigned to {}", department),
                    "department": department.as_str(),
                }),
            )
            .await;

        Ok(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{ReportSubmission, SubmittedLocation};
    use crate::shared::clock::FixedClock;
    use crate::shared::test_helpers::TestContext;

    fn submission(category: &str) -> ReportSubmission {
        ReportSubmission {
            user_id: None,
            title: Some("Overflowing drain".to_string()),
            description: Some("Drain overflowing onto the pavement".to_string()),
            category: Some(category.to_string()),
            location: Some(SubmittedLocation {
                latitude: Some(-33.8688),
                longitude: Some(151.2093),
            }),
            media_urls: vec![],
        }
    }

    fn router(ctx: &TestContext) -> DepartmentRouter {
        DepartmentRouter::new(
            ctx.reports.clone(),
            ctx.activity.clone(),
            Arc::new(FixedClock { hour: 9 }),
        )
    }

    #[tokio::test]
    async fn test_assign_persists_and_logs() {
        let ctx = TestContext::at_hour(9);
        let report_id = ctx.store(&submission("Sanitation")).await;

        let department = router(&ctx)
            .assign(report_id, ReportCategory::Sanitation)
            .await
            .unwrap();

        assert_eq!(department, Department::SanitationDept);
        let stored = ctx.reports.get_by_id(report_id).await.unwrap().unwrap();
        assert_eq!(stored.assigned_department, Some(Department::SanitationDept));
        assert!(stored.assigned_at.is_some());
        let entries = ctx.activity.list_for_report(report_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::Assigned);
        assert_eq!(
            entries[0].metadata["message"],
            "Report assigned to sanitation_dept"
        );
    }

    #[tokio::test]
    async fn test_assign_failure_is_returned_without_log() {
        let ctx = TestContext::at_hour(9);
        let report_id = ctx.store(&submission("Other")).await;
        ctx.reports.fail_assignment(true);

        let result = router(&ctx).assign(report_id, ReportCategory::Other).await;

        assert!(result.is_err());
        assert!(ctx
            .activity
            .list_for_report(report_id)
            .await
            .unwrap()
            .is_empty());
    }
}
