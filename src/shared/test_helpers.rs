use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::features::activity_logs::{ActivityLogger, InMemoryActivityLogRepository};
use crate::features::notifications::NotificationDispatcher;
use crate::features::reports::models::{CreateReport, ReportSubmission};
use crate::features::reports::repositories::{InMemoryReportRepository, ReportRepository};
use crate::features::reports::services::{
    validate_submission, DepartmentRouter, LocationEnricher, ReportAnalyzer, ReportPipeline,
    ReportService,
};
use crate::features::reports::workers::{report_events, ReportCreated};
use crate::modules::push::RecordingTransport;
use crate::shared::clock::{Clock, FixedClock};

const TEST_QUEUE_CAPACITY: usize = 64;

/// Fully wired in-memory service graph pinned to a local hour
pub struct TestContext {
    pub reports: Arc<InMemoryReportRepository>,
    pub activity_store: Arc<InMemoryActivityLogRepository>,
    pub activity: Arc<ActivityLogger>,
    pub transport: Arc<RecordingTransport>,
    pub pipeline: Arc<ReportPipeline>,
    pub service: Arc<ReportService>,
    events: Mutex<mpsc::Receiver<ReportCreated>>,
}

impl TestContext {
    pub fn at_hour(hour: u32) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock { hour });
        let reports = Arc::new(InMemoryReportRepository::new());
        let activity_store = Arc::new(InMemoryActivityLogRepository::new());
        let activity = Arc::new(ActivityLogger::new(activity_store.clone()));
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(transport.clone()));

        let pipeline = Arc::new(ReportPipeline::new(
            reports.clone(),
            Arc::new(ReportAnalyzer::heuristic(clock.clone())),
            Arc::new(LocationEnricher::default()),
            Arc::new(DepartmentRouter::new(
                reports.clone(),
                activity.clone(),
                clock.clone(),
            )),
            activity.clone(),
            dispatcher,
            clock.clone(),
        ));

        let (publisher, events) = report_events(TEST_QUEUE_CAPACITY);
        let service = Arc::new(ReportService::new(
            reports.clone(),
            activity.clone(),
            publisher,
            clock,
        ));

        Self {
            reports,
            activity_store,
            activity,
            transport,
            pipeline,
            service,
            events: Mutex::new(events),
        }
    }

    /// Store a submission as a pending report without queueing an event
    pub async fn store(&self, submission: &ReportSubmission) -> Uuid {
        let validated = validate_submission(submission).expect("test submission must be valid");
        let report = self
            .reports
            .create(&CreateReport {
                id: Uuid::now_v7(),
                user_id: validated.user_id,
                title: validated.title,
                description: validated.description,
                category: validated.category,
                location: validated.location,
                media_urls: validated.media_urls,
                created_at: chrono::Utc::now(),
            })
            .await
            .expect("in-memory create");
        report.id
    }

    /// Next queued "report created" event, if any
    pub async fn next_event(&self) -> Option<ReportCreated> {
        self.events.lock().await.try_recv().ok()
    }
}
