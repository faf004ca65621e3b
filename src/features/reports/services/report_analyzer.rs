//! Heuristic triage analysis of a validated report.
//!
//! Text and media analysis are pluggable backends. The analyzer itself never
//! fails: a text backend fault is replaced by [`AnalysisResult::fallback`] and
//! a media backend fault drops the media summary.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::features::reports::models::{
    AnalysisResult, MediaAnalysis, ReportCategory, ReportPriority, Sentiment, Severity,
};
use crate::features::reports::services::ValidatedReport;
use crate::shared::clock::Clock;

const URGENT_WORDS: &[&str] = &["urgent", "emergency", "critical", "dangerous", "severe"];
const NEGATIVE_WORDS: &[&str] = &["broken", "damaged", "problem", "issue", "failure"];
const POSITIVE_WORDS: &[&str] = &["fixed", "improved", "working", "good", "excellent"];

/// Description keywords that raise the triage score
const ESCALATION_WORDS: &[&str] = &["emergency", "urgent", "critical", "dangerous"];
const ESCALATION_BONUS: u32 = 2;
const NIGHT_BONUS: u32 = 1;

const SEVERE_WORDS: &[&str] = &["emergency", "critical", "dangerous"];
const MODERATE_WORDS: &[&str] = &["urgent", "major", "significant"];

const TAG_GROUPS: &[(&str, &[&str])] = &[
    ("road", &["road", "street", "highway", "path"]),
    ("water", &["water", "leak", "pipe", "drainage"]),
    ("electricity", &["electricity", "power", "light", "cable"]),
    ("waste", &["garbage", "trash", "waste", "litter"]),
    ("traffic", &["traffic", "signal", "jam", "congestion"]),
    ("safety", &["safety", "crime", "accident", "danger"]),
];

const CATEGORY_KEYWORDS: &[(ReportCategory, &[&str])] = &[
    (
        ReportCategory::Infrastructure,
        &["road", "bridge", "building", "construction"],
    ),
    (
        ReportCategory::Utilities,
        &["water", "electricity", "power", "gas"],
    ),
    (
        ReportCategory::Sanitation,
        &["garbage", "waste", "cleaning", "drainage"],
    ),
    (
        ReportCategory::Traffic,
        &["traffic", "signal", "parking", "vehicle"],
    ),
    (
        ReportCategory::Safety,
        &["crime", "accident", "danger", "emergency"],
    ),
];

const BASE_CONFIDENCE: f64 = 0.7;
const CONFIDENCE_PER_SIGNAL: f64 = 0.05;

const PLACEHOLDER_MEDIA_CONFIDENCE: f64 = 0.85;

/// Error from an analysis or geocoding backend
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend returned invalid output: {0}")]
    InvalidOutput(String),
}

#[async_trait]
pub trait TextAnalysisBackend: Send + Sync {
    /// Analyze report text; `local_hour` feeds the priority score
    async fn analyze(
        &self,
        report: &ValidatedReport,
        local_hour: u32,
    ) -> std::result::Result<AnalysisResult, CapabilityError>;
}

#[async_trait]
pub trait MediaAnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        media_urls: &[String],
    ) -> std::result::Result<MediaAnalysis, CapabilityError>;
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Sentiment of a description; urgent wins over negative over positive
pub fn detect_sentiment(description: &str) -> Sentiment {
    let text = description.to_lowercase();
    if contains_any(&text, URGENT_WORDS) {
        Sentiment::Urgent
    } else if contains_any(&text, NEGATIVE_WORDS) {
        Sentiment::Negative
    } else if contains_any(&text, POSITIVE_WORDS) {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

/// Triage score: category weight, escalation keywords in the description,
/// and reports filed at night (before 06:00 or after 22:59 local time)
pub fn priority_score(category: ReportCategory, description: &str, local_hour: u32) -> u32 {
    let mut score = category.weight();

    if contains_any(&description.to_lowercase(), ESCALATION_WORDS) {
        score += ESCALATION_BONUS;
    }

    if local_hour < 6 || local_hour > 22 {
        score += NIGHT_BONUS;
    }

    score
}

pub fn calculate_priority(
    category: ReportCategory,
    description: &str,
    local_hour: u32,
) -> ReportPriority {
    ReportPriority::from_score(priority_score(category, description, local_hour))
}

/// Topic tags found in `text`, in fixed group order
pub fn extract_tags(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    TAG_GROUPS
        .iter()
        .filter(|(_, words)| contains_any(&text, words))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// First category whose keywords appear in `text`
pub fn match_category(text: &str) -> Option<ReportCategory> {
    let text = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| contains_any(&text, words))
        .map(|(category, _)| *category)
}

pub fn estimate_severity(text: &str) -> Severity {
    let text = text.to_lowercase();
    if contains_any(&text, SEVERE_WORDS) {
        Severity::Severe
    } else if contains_any(&text, MODERATE_WORDS) {
        Severity::Moderate
    } else {
        Severity::Minor
    }
}

/// Keyword-based text analysis. Deterministic for a given hour.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextAnalyzer;

impl HeuristicTextAnalyzer {
    pub fn analyze_text(&self, report: &ValidatedReport, local_hour: u32) -> AnalysisResult {
        let combined = format!("{} {}", report.title, report.description);

        let sentiment = detect_sentiment(&report.description);
        let tags = extract_tags(&combined);
        let matched = match_category(&combined);

        let signals = usize::from(sentiment != Sentiment::Neutral)
            + tags.len()
            + usize::from(matched.is_some());
        let confidence = (BASE_CONFIDENCE + CONFIDENCE_PER_SIGNAL * signals as f64).min(1.0);

        AnalysisResult {
            sentiment,
            priority: calculate_priority(report.category, &report.description, local_hour),
            tags,
            confidence,
            suggested_category: matched.unwrap_or(report.category),
            estimated_severity: estimate_severity(&combined),
            media_analysis: None,
        }
    }
}

#[async_trait]
impl TextAnalysisBackend for HeuristicTextAnalyzer {
    async fn analyze(
        &self,
        report: &ValidatedReport,
        local_hour: u32,
    ) -> std::result::Result<AnalysisResult, CapabilityError> {
        Ok(self.analyze_text(report, local_hour))
    }
}

/// Media summary from file names only; content is never fetched
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderMediaAnalyzer;

fn media_kind(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "heic") => "image",
        Some("mp4" | "mov" | "webm" | "avi") => "video",
        Some("mp3" | "m4a" | "wav" | "ogg") => "audio",
        _ => "file",
    }
}

#[async_trait]
impl MediaAnalysisBackend for PlaceholderMediaAnalyzer {
    async fn analyze(
        &self,
        media_urls: &[String],
    ) -> std::result::Result<MediaAnalysis, CapabilityError> {
        let mut kinds: Vec<String> = Vec::new();
        for url in media_urls {
            let kind = media_kind(url);
            if !kinds.iter().any(|k| k == kind) {
                kinds.push(kind.to_string());
            }
        }

        Ok(MediaAnalysis {
            has_media: !media_urls.is_empty(),
            media_count: media_urls.len(),
            detected_objects: kinds,
            confidence: PLACEHOLDER_MEDIA_CONFIDENCE,
            description: format!("{} attachment(s) received", media_urls.len()),
        })
    }
}

/// Runs text and media analysis, absorbing backend faults
pub struct ReportAnalyzer {
    text: Arc<dyn TextAnalysisBackend>,
    media: Arc<dyn MediaAnalysisBackend>,
    clock: Arc<dyn Clock>,
}

impl ReportAnalyzer {
    pub fn new(
        text: Arc<dyn TextAnalysisBackend>,
        media: Arc<dyn MediaAnalysisBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { text, media, clock }
    }

    pub fn heuristic(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(HeuristicTextAnalyzer),
            Arc::new(PlaceholderMediaAnalyzer),
            clock,
        )
    }

    pub async fn analyze(&self, report: &ValidatedReport) -> AnalysisResult {
        let hour = self.clock.local_hour();

        let mut result = match self.text.analyze(report, hour).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    "Capability degraded: text analysis failed, using fallback: {}",
                    e
                );
                AnalysisResult::fallback(report.category)
            }
        };

        if !report.media_urls.is_empty() {
            match self.media.analyze(&report.media_urls).await {
                Ok(media) => result.media_analysis = Some(media),
                Err(e) => {
                    tracing::warn!(
                        "Capability degraded: media analysis failed, skipping: {}",
                        e
                    );
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::clock::FixedClock;
    use crate::shared::geo::GeoPoint;

    struct FailingText;

    #[async_trait]
    impl TextAnalysisBackend for FailingText {
        async fn analyze(
            &self,
            _report: &ValidatedReport,
            _local_hour: u32,
        ) -> std::result::Result<AnalysisResult, CapabilityError> {
            Err(CapabilityError::Unavailable("model offline".to_string()))
        }
    }

    struct FailingMedia;

    #[async_trait]
    impl MediaAnalysisBackend for FailingMedia {
        async fn analyze(
            &self,
            _media_urls: &[String],
        ) -> std::result::Result<MediaAnalysis, CapabilityError> {
            Err(CapabilityError::InvalidOutput("garbled".to_string()))
        }
    }

    fn report(title: &str, description: &str, category: ReportCategory) -> ValidatedReport {
        ValidatedReport {
            user_id: "citizen-1".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category,
            location: GeoPoint::new(40.7128, -74.0060),
            media_urls: vec![],
        }
    }

    #[test]
    fn test_sentiment_order() {
        assert_eq!(
            detect_sentiment("Broken and DANGEROUS wiring"),
            Sentiment::Urgent
        );
        assert_eq!(detect_sentiment("The pump is broken"), Sentiment::Negative);
        assert_eq!(
            detect_sentiment("Lights were fixed, good job"),
            Sentiment::Positive
        );
        assert_eq!(detect_sentiment("Bench needs paint"), Sentiment::Neutral);
    }

    #[test]
    fn test_priority_bands() {
        // 3 + 2 + 1
        assert_eq!(
            calculate_priority(ReportCategory::Safety, "Emergency: gas smell", 2),
            ReportPriority::High
        );
        // 0 + 2 + 0
        assert_eq!(
            calculate_priority(ReportCategory::Other, "urgent help", 14),
            ReportPriority::Medium
        );
        // 1 + 0 + 0
        assert_eq!(
            calculate_priority(ReportCategory::Traffic, "Signal timing is slow", 12),
            ReportPriority::Low
        );
        // hour 22 is not night, hour 23 is
        assert_eq!(priority_score(ReportCategory::Other, "quiet", 22), 0);
        assert_eq!(priority_score(ReportCategory::Other, "quiet", 23), 1);
        assert_eq!(priority_score(ReportCategory::Other, "quiet", 5), 1);
        assert_eq!(priority_score(ReportCategory::Other, "quiet", 6), 0);
    }

    #[test]
    fn test_category_weight_is_monotonic_in_score() {
        let description = "Something needs attention";
        for hour in [3, 12] {
            let scores: Vec<u32> = [
                ReportCategory::Other,
                ReportCategory::Sanitation,
                ReportCategory::Infrastructure,
                ReportCategory::Safety,
            ]
            .into_iter()
            .map(|c| priority_score(c, description, hour))
            .collect();
            assert!(scores.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_tags_in_group_order() {
        let tags = extract_tags("Trash blocking the street after the accident");
        assert_eq!(tags, vec!["road", "waste", "safety"]);
        assert!(extract_tags("Nice bench").is_empty());
    }

    #[test]
    fn test_suggested_category_first_match_wins() {
        assert_eq!(
            match_category("Water leak under the bridge"),
            Some(ReportCategory::Infrastructure)
        );
        assert_eq!(
            match_category("No parking signs"),
            Some(ReportCategory::Traffic)
        );
        assert_eq!(match_category("Stray dogs"), None);
    }

    #[test]
    fn test_severity() {
        assert_eq!(estimate_severity("Critical failure"), Severity::Severe);
        assert_eq!(estimate_severity("Major outage"), Severity::Moderate);
        assert_eq!(estimate_severity("Faded paint"), Severity::Minor);
    }

    #[test]
    fn test_heuristic_result() {
        let analyzer = HeuristicTextAnalyzer;
        let result = analyzer.analyze_text(
            &report(
                "Broken water pipe",
                "Water is leaking onto the road, a big problem",
                ReportCategory::Other,
            ),
            12,
        );

        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.tags, vec!["road", "water"]);
        assert_eq!(result.suggested_category, ReportCategory::Infrastructure);
        assert_eq!(result.priority, ReportPriority::Low);
        // sentiment + 2 tags + matched category
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_category_keeps_submitted_one() {
        let result = HeuristicTextAnalyzer.analyze_text(
            &report("Stray dogs", "Several dogs roam the park", ReportCategory::Other),
            12,
        );

        assert_eq!(result.suggested_category, ReportCategory::Other);
        assert!((result.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_is_capped() {
        let result = HeuristicTextAnalyzer.analyze_text(
            &report(
                "Road, water, power, trash, traffic, crime",
                "Urgent: the street pipe, cable, litter, jam and danger everywhere",
                ReportCategory::Safety,
            ),
            12,
        );
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_text_fault_falls_back() {
        let analyzer = ReportAnalyzer::new(
            Arc::new(FailingText),
            Arc::new(PlaceholderMediaAnalyzer),
            Arc::new(FixedClock { hour: 12 }),
        );

        let result = analyzer
            .analyze(&report(
                "Gas leak",
                "Emergency near the market",
                ReportCategory::Safety,
            ))
            .await;

        assert_eq!(result, AnalysisResult::fallback(ReportCategory::Safety));
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.priority, ReportPriority::Medium);
        assert_eq!(result.estimated_severity, Severity::Moderate);
    }

    #[tokio::test]
    async fn test_media_fault_keeps_text_result() {
        let analyzer = ReportAnalyzer::new(
            Arc::new(HeuristicTextAnalyzer),
            Arc::new(FailingMedia),
            Arc::new(FixedClock { hour: 12 }),
        );
        let mut input = report(
            "Broken light",
            "The street light is broken",
            ReportCategory::Utilities,
        );
        input.media_urls = vec!["https://cdn.example.org/a.jpg".to_string()];

        let result = analyzer.analyze(&input).await;

        assert!(result.media_analysis.is_none());
        assert_eq!(result.sentiment, Sentiment::Negative);
    }

    #[tokio::test]
    async fn test_media_only_analyzed_when_present() {
        let analyzer = ReportAnalyzer::heuristic(Arc::new(FixedClock { hour: 12 }));
        let mut input = report(
            "Broken light",
            "The street light is broken",
            ReportCategory::Utilities,
        );

        assert!(analyzer.analyze(&input).await.media_analysis.is_none());

        input.media_urls = vec![
            "https://cdn.example.org/a.JPG?size=large".to_string(),
            "https://cdn.example.org/b.png".to_string(),
            "https://cdn.example.org/c.mp4".to_string(),
        ];
        let media = analyzer.analyze(&input).await.media_analysis.unwrap();
        assert!(media.has_media);
        assert_eq!(media.media_count, 3);
        assert_eq!(media.detected_objects, vec!["image", "video"]);
    }
}
