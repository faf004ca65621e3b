mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::activity_logs::models::{ActivityLogEntry, CreateActivityLog};

pub use memory::InMemoryActivityLogRepository;
pub use postgres::PgActivityLogRepository;

/// Append-only store; entries are never updated or deleted
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    async fn append(&self, data: &CreateActivityLog) -> Result<ActivityLogEntry>;

    /// Oldest first
    async fn list_for_report(&self, report_id: Uuid) -> Result<Vec<ActivityLogEntry>>;
}
