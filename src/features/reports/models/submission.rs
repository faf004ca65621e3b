use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::geo::GeoPoint;

/// Coordinates as submitted; either axis may be missing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmittedLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SubmittedLocation {
    /// Both axes present and finite
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(GeoPoint::new(lat, lon))
            }
            _ => None,
        }
    }
}

impl From<GeoPoint> for SubmittedLocation {
    fn from(p: GeoPoint) -> Self {
        Self {
            latitude: Some(p.latitude),
            longitude: Some(p.longitude),
        }
    }
}

/// Raw report fields as delivered by a client or a "report created" event.
///
/// There is deliberately no priority or department field here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReportSubmission {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<SubmittedLocation>,
    #[serde(default)]
    pub media_urls: Vec<String>,
}
