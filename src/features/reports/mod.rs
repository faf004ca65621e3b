//! Citizen report intake and triage.
//!
//! A submitted report is stored as `pending` and a "report created" event is
//! queued for the [`ReportProcessor`], which runs the [`ReportPipeline`]:
//! validation, analysis, location enrichment, persistence, department routing
//! and urgent fan-out.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/reports` | Submit a report |
//! | GET | `/api/reports` | Most recent reports |
//! | GET | `/api/reports/nearby` | Reports near a point |
//! | GET | `/api/reports/{id}` | One report |
//! | PATCH | `/api/reports/{id}/status` | Move a report forward |
//! | GET | `/api/users/{user_id}/reports` | Reports filed by a user |
//! | POST | `/api/internal/reports/{id}/process` | Re-run triage (internal token) |
//! | GET | `/api/internal/reports/stale` | Reports past the retention age (internal token) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod workers;

pub use repositories::{InMemoryReportRepository, PgReportRepository, ReportRepository};
pub use services::{ReportPipeline, ReportService};
pub use workers::{report_events, ReportProcessor};
