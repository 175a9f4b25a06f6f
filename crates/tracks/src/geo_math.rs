//! Great-circle geometry and unit conversions.

use geo::{Bearing as _, Distance as _, Geodesic, Haversine};
use serde::{Deserialize, Serialize};

use crate::models::Coordinates;

const KMH_PER_MPS: f64 = 3.6;

/// How distances between two samples are measured.
///
/// Every component uses the same strategy so segment and track totals agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStrategy {
    /// Spherical earth approximation.
    #[default]
    Haversine,
    /// Ellipsoidal (Karney) distance; falls back to haversine on a non-finite result.
    Geodesic,
}

impl DistanceStrategy {
    pub fn distance(&self, a: Coordinates, b: Coordinates) -> f64 {
        match self {
            DistanceStrategy::Haversine => distance_m(a, b),
            DistanceStrategy::Geodesic => {
                let d = Geodesic.distance(a.point(), b.point());
                if d.is_finite() {
                    d
                } else {
                    tracing::debug!("geodesic distance failed, using haversine");
                    distance_m(a, b)
                }
            }
        }
    }
}

/// Haversine distance in meters.
pub fn distance_m(a: Coordinates, b: Coordinates) -> f64 {
    Haversine.distance(a.point(), b.point())
}

/// Initial bearing from `a` to `b` in degrees, normalized to `[0, 360)`.
pub fn bearing_deg(a: Coordinates, b: Coordinates) -> f64 {
    Haversine.bearing(a.point(), b.point()).rem_euclid(360.0)
}

pub fn to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * KMH_PER_MPS
}

pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / KMH_PER_MPS
}

/// Average speed in km/h, 0 when the duration is not positive.
pub fn avg_speed_kmh(distance_m: f64, duration_s: f64) -> f64 {
    if duration_s > 0.0 {
        mps_to_kmh(distance_m / duration_s)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERLIN: Coordinates = Coordinates::new(52.5200, 13.4050);
    const POTSDAM: Coordinates = Coordinates::new(52.3906, 13.0645);

    #[test]
    fn test_distance_known_pair() {
        let d = distance_m(BERLIN, POTSDAM);
        assert!((d - 26_800.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        assert_eq!(distance_m(BERLIN, BERLIN), 0.0);
    }

    #[test]
    fn test_geodesic_close_to_haversine() {
        let h = DistanceStrategy::Haversine.distance(BERLIN, POTSDAM);
        let g = DistanceStrategy::Geodesic.distance(BERLIN, POTSDAM);
        assert!((h - g).abs() / h < 0.01);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinates::new(0.0, 0.0);
        let north = bearing_deg(origin, Coordinates::new(1.0, 0.0));
        let east = bearing_deg(origin, Coordinates::new(0.0, 1.0));
        let west = bearing_deg(origin, Coordinates::new(0.0, -1.0));
        assert!(north.abs() < 1e-6 || (north - 360.0).abs() < 1e-6);
        assert!((east - 90.0).abs() < 1e-6);
        assert!((west - 270.0).abs() < 1e-6);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((mps_to_kmh(15.0) - 54.0).abs() < 1e-9);
        assert!((kmh_to_mps(36.0) - 10.0).abs() < 1e-9);
        assert!((to_degrees(to_radians(123.0)) - 123.0).abs() < 1e-9);
        assert_eq!(avg_speed_kmh(1000.0, 0.0), 0.0);
        assert!((avg_speed_kmh(1000.0, 100.0) - 36.0).abs() < 1e-9);
    }
}
