mod analysis;
mod report;
mod report_location;
mod submission;

pub use analysis::{AnalysisResult, MediaAnalysis, Sentiment, Severity};
pub use report::{
    estimate_resolution_hours, CreateReport, Department, DepartmentAssignment, ProcessedReport,
    Report, ReportCategory, ReportPriority, ReportStatus, StatusChange,
};
pub use report_location::{EnrichedLocation, GeocodingSource, LocationEnrichment};
pub use submission::{ReportSubmission, SubmittedLocation};
