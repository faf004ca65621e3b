use std::sync::Arc;

use async_trait::async_trait;

use crate::features::reports::models::{EnrichedLocation, GeocodingSource, LocationEnrichment};
use crate::features::reports::services::CapabilityError;
use crate::shared::geo::GeoPoint;

/// Reverse geocoding of a coordinate pair into administrative metadata
#[async_trait]
pub trait GeocodingBackend: Send + Sync {
    async fn enrich(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> std::result::Result<LocationEnrichment, CapabilityError>;
}

/// Fixed placeholder metadata; no lookup is performed
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGeocoder;

#[async_trait]
impl GeocodingBackend for PlaceholderGeocoder {
    async fn enrich(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> std::result::Result<LocationEnrichment, CapabilityError> {
        Ok(LocationEnrichment {
            address: format!("Near {:.5}, {:.5}", latitude, longitude),
            ward: "Unassigned ward".to_string(),
            district: "Central District".to_string(),
            postal_code: None,
            nearby_landmarks: Vec::new(),
            administrative_area: "Municipal Corporation Area".to_string(),
            source: GeocodingSource::Placeholder,
        })
    }
}

/// Attaches geocoding metadata to report locations.
///
/// Enrichment is recomputed for every call. A backend fault leaves the
/// location as submitted.
pub struct LocationEnricher {
    backend: Arc<dyn GeocodingBackend>,
}

impl LocationEnricher {
    pub fn new(backend: Arc<dyn GeocodingBackend>) -> Self {
        Self { backend }
    }

    pub async fn enrich(&self, point: GeoPoint) -> EnrichedLocation {
        match self.backend.enrich(point.latitude, point.longitude).await {
            Ok(enrichment) => {
                tracing::debug!(
                    "Enriched location {:.5},{:.5} via {}",
                    point.latitude,
                    point.longitude,
                    enrichment.source
                );
                EnrichedLocation {
                    latitude: point.latitude,
                    longitude: point.longitude,
                    enrichment: Some(enrichment),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Capability degraded: geocoding failed for {:.5},{:.5}: {}",
                    point.latitude,
                    point.longitude,
                    e
                );
                EnrichedLocation::bare(point)
            }
        }
    }
}

impl Default for LocationEnricher {
    fn default() -> Self {
        Self::new(Arc::new(PlaceholderGeocoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DownGeocoder;

    #[async_trait]
    impl GeocodingBackend for DownGeocoder {
        async fn enrich(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> std::result::Result<LocationEnrichment, CapabilityError> {
            Err(CapabilityError::Unavailable("timeout".to_string()))
        }
    }

    #[tokio::test]
    async fn test_placeholder_keeps_coordinates() {
        let enricher = LocationEnricher::default();
        let point = GeoPoint::new(-6.2088, 106.8456);

        let enriched = enricher.enrich(point).await;

        assert_eq!(enriched.point(), point);
        let enrichment = enriched.enrichment.unwrap();
        assert_eq!(enrichment.source, GeocodingSource::Placeholder);
        assert_eq!(enrichment.address, "Near -6.20880, 106.84560");
    }

    #[tokio::test]
    async fn test_backend_fault_returns_bare_location() {
        let enricher = LocationEnricher::new(Arc::new(DownGeocoder));
        let point = GeoPoint::new(51.5074, -0.1278);

        let enriched = enricher.enrich(point).await;

        assert_eq!(enriched, EnrichedLocation::bare(point));
    }
}
