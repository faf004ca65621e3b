use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{EARTH_RADIUS_KM, TOPIC_LOCATION_PREFIX};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Coarse grid cell this point falls in, `floor(lat*100)_floor(lon*100)`
    pub fn bucket(&self) -> String {
        format!(
            "{}_{}",
            (self.latitude * 100.0).floor() as i64,
            (self.longitude * 100.0).floor() as i64
        )
    }

    /// Notification topic for users near this point
    pub fn topic(&self) -> String {
        format!("{}{}", TOPIC_LOCATION_PREFIX, self.bucket())
    }
}

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;

    #[test]
    fn test_haversine_known_distance() {
        // Jakarta to Bandung, approx 116km great-circle
        let jakarta = GeoPoint::new(-6.2088, 106.8456);
        let bandung = GeoPoint::new(-6.9175, 107.6191);

        let distance = jakarta.distance_km(&bandung);
        assert!(distance > 110.0 && distance < 125.0);
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        let distance = haversine_km(-6.2088, 106.8456, -6.2088, 106.8456);
        assert!(distance.abs() < 1e-9);
    }

    #[test]
    fn test_haversine_symmetric_for_random_pairs() {
        for _ in 0..200 {
            let a = GeoPoint::new((-90.0..90.0).fake(), (-180.0..180.0).fake());
            let b = GeoPoint::new((-90.0..90.0).fake(), (-180.0..180.0).fake());

            let ab = a.distance_km(&b);
            let ba = b.distance_km(&a);
            assert!((ab - ba).abs() < 1e-6, "{:?} {:?}: {} vs {}", a, b, ab, ba);
            assert!(a.distance_km(&a).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bucket_floors_toward_negative_infinity() {
        assert_eq!(GeoPoint::new(40.7128, -74.0060).bucket(), "4071_-7401");
        assert_eq!(GeoPoint::new(-6.2088, 106.8456).bucket(), "-621_10684");
        assert_eq!(GeoPoint::new(0.0, 0.0).topic(), "location_0_0");
    }
}
