use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::config::ProcessorConfig;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::ReportSubmission;
use crate::features::reports::services::{PipelineError, ProcessingOutcome, ReportPipeline};

/// Emitted once a report has been stored in `pending` state
#[derive(Debug, Clone)]
pub struct ReportCreated {
    pub report_id: Uuid,
    pub submission: ReportSubmission,
}

/// Sending half of the "report created" queue
#[derive(Clone)]
pub struct ReportEventPublisher {
    tx: mpsc::Sender<ReportCreated>,
}

impl ReportEventPublisher {
    /// Queue an event, waiting for capacity when the queue is full
    pub async fn publish(&self, event: ReportCreated) -> Result<()> {
        let report_id = event.report_id;
        self.tx.send(event).await.map_err(|_| {
            tracing::error!("Report processor is not running, dropped report {}", report_id);
            AppError::ServiceUnavailable("Report processing is unavailable".to_string())
        })
    }
}

/// Create the "report created" queue
pub fn report_events(capacity: usize) -> (ReportEventPublisher, mpsc::Receiver<ReportCreated>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ReportEventPublisher { tx }, rx)
}

/// Background worker that triages every created report.
///
/// Each event runs on its own task so reports are processed concurrently.
/// Persistence and routing failures are retried up to `max_retries` attempts;
/// invalid input and fan-out failures are reported once and dropped.
pub struct ReportProcessor {
    pipeline: Arc<ReportPipeline>,
    config: ProcessorConfig,
}

impl ReportProcessor {
    pub fn new(pipeline: Arc<ReportPipeline>, config: ProcessorConfig) -> Self {
        Self { pipeline, config }
    }

    /// Consume events until every publisher has been dropped
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<ReportCreated>) {
        tracing::info!("Starting report processor worker");

        while let Some(event) = events.recv().await {
            let processor = self.clone();
            tokio::spawn(async move {
                let report_id = event.report_id;
                if let Err(e) = processor.handle(event).await {
                    tracing::error!(
                        "Report {} processing failed [{}]: {}",
                        report_id,
                        e.code(),
                        e
                    );
                }
            });
        }

        tracing::info!("Report processor worker stopped");
    }

    pub async fn handle(
        &self,
        event: ReportCreated,
    ) -> std::result::Result<ProcessingOutcome, PipelineError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempt = 1;

        loop {
            match self
                .pipeline
                .on_report_created(event.report_id, &event.submission)
                .await
            {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        "Report {} attempt {}/{} failed, retrying in {:?}: {}",
                        event.report_id,
                        attempt,
                        max_attempts,
                        self.config.retry_delay,
                        e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
