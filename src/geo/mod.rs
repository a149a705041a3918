// Geodesy helpers - one position type and one distance function
// Zone radii are a few meters, so spherical-earth haversine is plenty

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters, spherical model.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A single GPS fix. Accuracy and timestamp come along when the source
/// has them; the tracker itself only ever looks at the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp: None,
        }
    }
}

/// Great-circle surface distance between two fixes, in meters.
///
/// Haversine on a sphere of radius [`EARTH_RADIUS_M`]. Inputs are degrees,
/// unrestricted; NaN coordinates propagate to a NaN distance rather than
/// being treated as an error.
pub fn distance_meters(a: Position, b: Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = Position::new(38.849290, 29.959364);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_known_separation() {
        // Two monument positions from a real tour route, roughly 690 m apart
        let a = Position::new(38.849290, 29.959364);
        let b = Position::new(38.843101, 29.959400);
        let d = distance_meters(a, b);
        assert!((680.0..700.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_small_separation_in_meters() {
        // ~0.0001 deg latitude is about 11 m on the ground
        let a = Position::new(38.843101, 29.959400);
        let b = Position::new(38.843201, 29.959400);
        let d = distance_meters(a, b);
        assert!((10.0..13.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = Position::new(38.843176, 29.959135);
        let b = Position::new(38.843068, 29.958726);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_nan_propagates() {
        let a = Position::new(f64::NAN, 29.0);
        let b = Position::new(38.0, 29.0);
        assert!(distance_meters(a, b).is_nan());
    }
}
