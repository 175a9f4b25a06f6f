//! Configuration types for test data generation.

use serde::{Deserialize, Serialize};

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Minimum longitude (west)
    pub min_lon: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Maximum longitude (east)
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Returns a random point within the bounding box.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..self.max_lat);
        let lon = rng.gen_range(self.min_lon..self.max_lon);
        (lat, lon)
    }
}

/// Pre-defined start areas for generated journeys.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// Munich city area: mixed walking, transit and driving.
    pub const MUNICH: BoundingBox = BoundingBox::new(48.08, 11.45, 48.2, 11.7);
}

/// How generated samples are annotated with provider motion data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStyle {
    /// Bare samples; mode must be inferred from movement.
    #[default]
    None,
    /// Overland `motion` arrays.
    Overland,
    /// Google Records.json probable-activity lists.
    Google,
    /// OwnTracks numeric motion states.
    OwnTracks,
}

/// Sampling parameters shared by all legs of a journey.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Seconds between consecutive samples.
    pub interval_seconds: i64,
    /// GPS position jitter standard deviation in meters.
    pub gps_jitter_m: f64,
    /// Altitude jitter standard deviation in meters.
    pub altitude_jitter_m: f64,
    /// Whether samples carry a device-reported velocity.
    pub report_velocity: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            gps_jitter_m: 3.0,
            altitude_jitter_m: 2.0,
            report_velocity: true,
        }
    }
}

impl SamplingConfig {
    /// Noise-free sampling for deterministic scenario tests.
    pub fn exact(interval_seconds: i64) -> Self {
        Self {
            interval_seconds,
            gps_jitter_m: 0.0,
            altitude_jitter_m: 0.0,
            report_velocity: true,
        }
    }
}
