#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ActivityLogRepository;
#[cfg(test)]
use crate::core::error::AppError;
use crate::core::error::Result;
use crate::features::activity_logs::models::{ActivityLogEntry, CreateActivityLog};

/// Process-local activity log, used when no database is configured
#[derive(Default)]
pub struct InMemoryActivityLogRepository {
    entries: RwLock<Vec<ActivityLogEntry>>,
    #[cfg(test)]
    failing: AtomicBool,
}

impl InMemoryActivityLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every append fail until cleared
    #[cfg(test)]
    pub fn fail_appends(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryActivityLogRepository {
    async fn append(&self, data: &CreateActivityLog) -> Result<ActivityLogEntry> {
        #[cfg(test)]
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated activity log fault".to_string()));
        }

        let entry = ActivityLogEntry {
            id: Uuid::now_v7(),
            report_id: data.report_id,
            action: data.action,
            metadata: data.metadata.clone(),
            created_by: data.created_by.clone(),
            timestamp: Utc::now(),
        };
        self.entries.write().await.push(entry.clone());

        Ok(entry)
    }

    async fn list_for_report(&self, report_id: Uuid) -> Result<Vec<ActivityLogEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.report_id == report_id)
            .cloned()
            .collect())
    }
}
