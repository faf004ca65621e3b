mod department_router;
mod location_enricher;
mod report_analyzer;
mod report_pipeline;
mod report_service;
mod report_validator;

pub use department_router::DepartmentRouter;
pub use location_enricher::LocationEnricher;
pub use report_analyzer::{CapabilityError, ReportAnalyzer};
pub use report_pipeline::{PipelineError, ProcessingOutcome, ReportPipeline};
pub use report_service::{NearbyReport, ReportService};
pub use report_validator::{validate_submission, ValidatedReport};
