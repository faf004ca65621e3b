use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::{ReportCategory, ReportPriority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Urgent,
    Negative,
    Positive,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

/// Summary of attached media produced by a media analysis backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaAnalysis {
    pub has_media: bool,
    pub media_count: usize,
    pub detected_objects: Vec<String>,
    pub confidence: f64,
    pub description: String,
}

/// Triage analysis embedded into the report it was computed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub priority: ReportPriority,
    pub tags: Vec<String>,
    pub confidence: f64,
    pub suggested_category: ReportCategory,
    pub estimated_severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_analysis: Option<MediaAnalysis>,
}

impl AnalysisResult {
    /// Substitute used when the analysis backend fails
    pub fn fallback(category: ReportCategory) -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            priority: ReportPriority::Medium,
            tags: Vec::new(),
            confidence: 0.5,
            suggested_category: category,
            estimated_severity: Severity::Moderate,
            media_analysis: None,
        }
    }
}
