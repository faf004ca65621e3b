//! Append-only audit trail of everything that happens to a report.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/reports/{id}/activity` | Activity trail of a report, oldest first |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{
    ActivityLogRepository, InMemoryActivityLogRepository, PgActivityLogRepository,
};
pub use services::ActivityLogger;
