//! Triage of a newly created report.
//!
//! Stages run in order: validate, analyze, enrich, persist, log "created",
//! route, log "assigned". Validation failures end the run before anything is
//! written. Persistence and routing failures write an `error` entry to the
//! activity log and are surfaced. Activity logging itself never fails a run.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::activity_logs::models::ActivityAction;
use crate::features::activity_logs::ActivityLogger;
use crate::features::notifications::models::UrgentReportAlert;
use crate::features::notifications::{NotificationDispatcher, NotificationError};
use crate::features::reports::models::{
    estimate_resolution_hours, Department, ProcessedReport, ReportCategory, ReportPriority,
    ReportSubmission,
};
use crate::features::reports::repositories::ReportRepository;
use crate::features::reports::services::{
    validate_submission, DepartmentRouter, LocationEnricher, ReportAnalyzer, ValidatedReport,
};
use crate::shared::clock::Clock;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid report data: {}", .0.join(", "))]
    InvalidInput(Vec<String>),

    #[error("Failed to persist triage of report {report_id}: {source}")]
    PersistenceFailure {
        report_id: Uuid,
        #[source]
        source: AppError,
    },

    #[error("Failed to route report {report_id}: {source}")]
    RoutingFailure {
        report_id: Uuid,
        #[source]
        source: AppError,
    },

    #[error("Urgent notification for report {report_id} failed: {source}")]
    DispatchFailure {
        report_id: Uuid,
        #[source]
        source: NotificationError,
    },
}

impl PipelineError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "INVALID_INPUT",
            PipelineError::PersistenceFailure { .. } => "PERSISTENCE_FAILURE",
            PipelineError::RoutingFailure { .. } => "ROUTING_FAILURE",
            PipelineError::DispatchFailure { .. } => "DISPATCH_FAILURE",
        }
    }

    /// Whether re-running the pipeline for the same event may succeed.
    ///
    /// A fan-out failure happens after the report is fully triaged, so a
    /// re-run would only repeat the triage.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::PersistenceFailure { .. } | PipelineError::RoutingFailure { .. }
        )
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::InvalidInput(errors) => AppError::InvalidInput(errors),
            PipelineError::PersistenceFailure { source, .. }
            | PipelineError::RoutingFailure { source, .. } => source,
            PipelineError::DispatchFailure { .. } => AppError::ExternalServiceError(e.to_string()),
        }
    }
}

/// Result of a completed triage
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub report_id: Uuid,
    pub report: ValidatedReport,
    pub priority: ReportPriority,
    pub department: Department,
    pub estimated_resolution_hours: i32,
    /// Authorities and nearby users should be alerted
    pub urgent: bool,
}

impl ProcessingOutcome {
    pub fn urgent_alert(&self) -> UrgentReportAlert {
        UrgentReportAlert {
            report_id: self.report_id,
            title: self.report.title.clone(),
            category: self.report.category.to_string(),
            location: Some(self.report.location),
        }
    }
}

pub struct ReportPipeline {
    reports: Arc<dyn ReportRepository>,
    analyzer: Arc<ReportAnalyzer>,
    enricher: Arc<LocationEnricher>,
    router: Arc<DepartmentRouter>,
    activity: Arc<ActivityLogger>,
    dispatcher: Arc<NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl ReportPipeline {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        analyzer: Arc<ReportAnalyzer>,
        enricher: Arc<LocationEnricher>,
        router: Arc<DepartmentRouter>,
        activity: Arc<ActivityLogger>,
        dispatcher: Arc<NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reports,
            analyzer,
            enricher,
            router,
            activity,
            dispatcher,
            clock,
        }
    }

    /// Run triage, then alert authorities and nearby users when warranted
    pub async fn on_report_created(
        &self,
        report_id: Uuid,
        submission: &ReportSubmission,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let outcome = self.process_new_report(report_id, submission).await?;

        if outcome.urgent {
            tracing::info!(
                "Report {} is urgent (category={}, priority={}), notifying",
                report_id,
                outcome.report.category,
                outcome.priority
            );
            self.dispatcher
                .send_urgent_report_notification(&outcome.urgent_alert())
                .await
                .map_err(|source| PipelineError::DispatchFailure { report_id, source })?;
        }

        Ok(outcome)
    }

    pub async fn process_new_report(
        &self,
        report_id: Uuid,
        submission: &ReportSubmission,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let report = validate_submission(submission).map_err(|errors| {
            tracing::warn!("Report {} failed validation: {:?}", report_id, errors);
            PipelineError::InvalidInput(errors)
        })?;

        let analysis = self.analyzer.analyze(&report).await;
        let location_data = self.enricher.enrich(report.location).await;

        let priority = analysis.priority;
        let estimated_resolution_hours = estimate_resolution_hours(priority, report.category);
        let processed = ProcessedReport {
            analysis,
            location_data,
            priority,
            estimated_resolution_hours,
            processed_at: self.clock.now(),
        };

        if let Err(source) = self.reports.save_processing(report_id, &processed).await {
            tracing::error!("Failed to persist triage of report {}: {}", report_id, source);
            self.record_failure(report_id, "persisting", &source).await;
            return Err(PipelineError::PersistenceFailure { report_id, source });
        }

        self.activity
            .record(
                report_id,
                ActivityAction::Created,
                json!({
                    "message": "Report created and processed",
                    "category": report.category.as_str(),
                    "priority": priority,
                    "estimatedResolutionHours": estimated_resolution_hours,
                }),
            )
            .await;

        let department = match self.router.assign(report_id, report.category).await {
            Ok(department) => department,
            Err(source) => {
                tracing::error!("Failed to route report {}: {}", report_id, source);
                self.record_failure(report_id, "routing", &source).await;
                return Err(PipelineError::RoutingFailure { report_id, source });
            }
        };

        let urgent = report.category == ReportCategory::Safety || priority == ReportPriority::High;

        tracing::info!(
            "Report {} processed: priority={}, department={}, eta={}h",
            report_id,
            priority,
            department,
            estimated_resolution_hours
        );

        Ok(ProcessingOutcome {
            report_id,
            report,
            priority,
            department,
            estimated_resolution_hours,
            urgent,
        })
    }

    async fn record_failure(&self, report_id: Uuid, stage: &str, error: &AppError) {
        self.activity
            .record(
                report_id,
                ActivityAction::Error,
                json!({
                    "message": format!("Report processing failed while {}", stage),
                    "stage": stage,
                    "error": error.to_string(),
                }),
            )
            .await;
    }
}
