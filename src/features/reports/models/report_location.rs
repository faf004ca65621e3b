use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::geo::GeoPoint;

/// Geocoding source of an enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GeocodingSource {
    Placeholder,
    Backend,
}

impl std::fmt::Display for GeocodingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodingSource::Placeholder => write!(f, "placeholder"),
            GeocodingSource::Backend => write!(f, "backend"),
        }
    }
}

/// Administrative metadata derived for a coordinate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationEnrichment {
    pub address: String,
    pub ward: String,
    pub district: String,
    pub postal_code: Option<String>,
    pub nearby_landmarks: Vec<String>,
    pub administrative_area: String,
    pub source: GeocodingSource,
}

/// A report location with whatever enrichment could be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrichedLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<LocationEnrichment>,
}

impl EnrichedLocation {
    /// The location exactly as submitted, without enrichment
    pub fn bare(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            enrichment: None,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
