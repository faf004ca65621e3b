use crate::features::reports::models::{ReportCategory, ReportSubmission};
use crate::shared::constants::ANONYMOUS_USER;
use crate::shared::geo::GeoPoint;

const MIN_TITLE_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters long";
pub const DESCRIPTION_TOO_SHORT: &str = "Description must be at least 10 characters long";
pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const LOCATION_REQUIRED: &str = "Valid location coordinates are required";
pub const LOCATION_OUT_OF_RANGE: &str = "Invalid location coordinates";

/// A submission that passed every intake rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReport {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: GeoPoint,
    pub media_urls: Vec<String>,
}

fn too_short(value: Option<&str>, min: usize) -> bool {
    value.map_or(true, |v| v.trim().chars().count() < min)
}

/// NaN is treated as missing, not out of range
fn out_of_range(value: f64, bound: f64) -> bool {
    !value.is_nan() && !(-bound..=bound).contains(&value)
}

/// Check a raw submission against every intake rule.
///
/// All rules are evaluated; the error list keeps rule order so clients can
/// show every problem at once.
pub fn validate_submission(
    submission: &ReportSubmission,
) -> std::result::Result<ValidatedReport, Vec<String>> {
    let mut errors = Vec::new();

    if too_short(submission.title.as_deref(), MIN_TITLE_CHARS) {
        errors.push(TITLE_TOO_SHORT.to_string());
    }

    if too_short(submission.description.as_deref(), MIN_DESCRIPTION_CHARS) {
        errors.push(DESCRIPTION_TOO_SHORT.to_string());
    }

    let category = submission
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if category.is_none() {
        errors.push(CATEGORY_REQUIRED.to_string());
    }

    let point = submission.location.and_then(|l| l.point());
    if point.is_none() {
        errors.push(LOCATION_REQUIRED.to_string());
    }

    if let Some(location) = submission.location {
        let lat_out = location.latitude.is_some_and(|v| out_of_range(v, 90.0));
        let lon_out = location.longitude.is_some_and(|v| out_of_range(v, 180.0));
        if lat_out || lon_out {
            errors.push(LOCATION_OUT_OF_RANGE.to_string());
        }
    }

    match (errors.is_empty(), category, point) {
        (true, Some(category), Some(location)) => Ok(ValidatedReport {
            user_id: submission
                .user_id
                .clone()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            title: submission.title.clone().unwrap_or_default(),
            description: submission.description.clone().unwrap_or_default(),
            category: ReportCategory::parse_lenient(category),
            location,
            media_urls: submission.media_urls.clone(),
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::SubmittedLocation;
    use fake::Fake;

    fn valid_submission() -> ReportSubmission {
        ReportSubmission {
            user_id: Some("citizen-42".to_string()),
            title: Some("Pothole on Main St".to_string()),
            description: Some("A deep pothole near the school gate".to_string()),
            category: Some("Infrastructure".to_string()),
            location: Some(SubmittedLocation {
                latitude: Some(40.7128),
                longitude: Some(-74.0060),
            }),
            media_urls: vec![],
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let report = validate_submission(&valid_submission()).unwrap();
        assert_eq!(report.category, ReportCategory::Infrastructure);
        assert_eq!(report.user_id, "citizen-42");
    }

    #[test]
    fn test_short_description_has_exact_message() {
        let submission = ReportSubmission {
            description: Some("short".to_string()),
            ..valid_submission()
        };

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors, vec!["Description must be at least 10 characters long"]);
    }

    #[test]
    fn test_whitespace_does_not_count_toward_length() {
        let submission = ReportSubmission {
            title: Some("  ab   ".to_string()),
            ..valid_submission()
        };

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors, vec![TITLE_TOO_SHORT]);
    }

    #[test]
    fn test_all_violations_reported_in_order() {
        let submission = ReportSubmission {
            user_id: None,
            title: Some("x".to_string()),
            description: None,
            category: Some("   ".to_string()),
            location: None,
            media_urls: vec![],
        };

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(
            errors,
            vec![
                TITLE_TOO_SHORT,
                DESCRIPTION_TOO_SHORT,
                CATEGORY_REQUIRED,
                LOCATION_REQUIRED
            ]
        );
    }

    #[test]
    fn test_missing_axis_and_out_of_range_axis_both_reported() {
        let submission = ReportSubmission {
            location: Some(SubmittedLocation {
                latitude: Some(95.0),
                longitude: None,
            }),
            ..valid_submission()
        };

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors, vec![LOCATION_REQUIRED, LOCATION_OUT_OF_RANGE]);
    }

    #[test]
    fn test_out_of_range_longitude() {
        let submission = ReportSubmission {
            location: Some(SubmittedLocation {
                latitude: Some(10.0),
                longitude: Some(-180.5),
            }),
            ..valid_submission()
        };

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors, vec![LOCATION_OUT_OF_RANGE]);
    }

    #[test]
    fn test_non_finite_coordinate_is_missing() {
        let submission = ReportSubmission {
            location: Some(SubmittedLocation {
                latitude: Some(f64::NAN),
                longitude: Some(12.0),
            }),
            ..valid_submission()
        };

        let errors = validate_submission(&submission).unwrap_err();
        assert_eq!(errors, vec![LOCATION_REQUIRED]);
    }

    #[test]
    fn test_zero_coordinates_are_valid() {
        let submission = ReportSubmission {
            location: Some(SubmittedLocation {
                latitude: Some(0.0),
                longitude: Some(0.0),
            }),
            ..valid_submission()
        };

        let report = validate_submission(&submission).unwrap();
        assert_eq!(report.location, GeoPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_any_in_range_point_is_accepted() {
        for _ in 0..100 {
            let lat: f64 = (-90.0..90.0).fake();
            let lon: f64 = (-180.0..180.0).fake();
            let submission = ReportSubmission {
                location: Some(SubmittedLocation {
                    latitude: Some(lat),
                    longitude: Some(lon),
                }),
                ..valid_submission()
            };
            assert!(validate_submission(&submission).is_ok());
        }
    }

    #[test]
    fn test_unknown_category_is_accepted_as_other() {
        let submission = ReportSubmission {
            category: Some("Parks".to_string()),
            user_id: None,
            ..valid_submission()
        };

        let report = validate_submission(&submission).unwrap();
        assert_eq!(report.category, ReportCategory::Other);
        assert_eq!(report.user_id, "anonymous");
    }
}
