use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::activity_logs::models::{ActivityAction, ActivityLogEntry, CreateActivityLog};
use crate::features::activity_logs::repositories::ActivityLogRepository;
use crate::shared::constants::SYSTEM_ACTOR;

/// Best-effort writer for the report audit trail.
///
/// Recording never fails from the caller's point of view: a store fault is
/// logged and swallowed so it cannot change the outcome of the operation
/// being audited.
pub struct ActivityLogger {
    repository: Arc<dyn ActivityLogRepository>,
}

impl ActivityLogger {
    pub fn new(repository: Arc<dyn ActivityLogRepository>) -> Self {
        Self { repository }
    }

    /// Record an action performed by the pipeline itself
    pub async fn record(&self, report_id: Uuid, action: ActivityAction, metadata: Value) {
        self.record_as(report_id, action, metadata, SYSTEM_ACTOR)
            .await;
    }

    /// Record an action performed by a named actor
    pub async fn record_as(
        &self,
        report_id: Uuid,
        action: ActivityAction,
        metadata: Value,
        actor: &str,
    ) {
        let data = CreateActivityLog {
            report_id,
            action,
            metadata,
            created_by: actor.to_string(),
        };

        match self.repository.append(&data).await {
            Ok(entry) => {
                tracing::debug!("Activity logged: report={}, action={}", report_id, entry.action);
            }
            Err(e) => {
                tracing::error!(
                    "Failed to log activity for report {} (action={}): {:?}",
                    report_id,
                    action,
                    e
                );
            }
        }
    }

    /// Activity trail of a report, oldest first
    pub async fn list_for_report(&self, report_id: Uuid) -> Result<Vec<ActivityLogEntry>> {
        self.repository.list_for_report(report_id).await
    }
}
