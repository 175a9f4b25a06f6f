//! Speed/acceleration based transportation mode classification.
//!
//! Deterministic and side-effect free: identical inputs always yield identical
//! outputs.

use serde::Serialize;

use crate::models::{CanonicalMode, Confidence};

/// Physics summary of one stretch of movement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MotionStats {
    pub avg_speed_kmh: f64,
    /// Defaults to `avg_speed_kmh` when absent.
    pub max_speed_kmh: Option<f64>,
    /// Mean absolute acceleration in m/s². Defaults to 0 when absent.
    pub avg_acceleration: Option<f64>,
    /// Informational only.
    pub duration_s: f64,
}

impl MotionStats {
    pub fn from_speed(avg_speed_kmh: f64) -> Self {
        Self {
            avg_speed_kmh,
            ..Default::default()
        }
    }

    pub fn with_max_speed(mut self, max_speed_kmh: f64) -> Self {
        self.max_speed_kmh = Some(max_speed_kmh);
        self
    }

    pub fn with_acceleration(mut self, avg_acceleration: f64) -> Self {
        self.avg_acceleration = Some(avg_acceleration);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub mode: CanonicalMode,
    pub confidence: Confidence,
}

/// Speed bands (km/h) and acceleration tie-breakers (m/s²).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    pub stationary_max_kmh: f64,
    pub flying_min_avg_kmh: f64,
    pub flying_min_max_kmh: f64,
    pub train_min_kmh: f64,
    pub train_max_kmh: f64,
    pub train_max_accel: f64,
    /// Max/avg speed ratio below which a train's speed counts as steady.
    pub train_max_speed_ratio: f64,
    pub walking_max_kmh: f64,
    pub running_cycling_max_kmh: f64,
    pub running_min_accel: f64,
    pub urban_max_kmh: f64,
    pub urban_driving_min_accel: f64,
    pub cycling_max_kmh: f64,
    pub road_max_kmh: f64,
    pub bus_accel_range: (f64, f64),
    pub motorcycle_min_accel: f64,
    pub fast_max_kmh: f64,
}

impl ClassifierThresholds {
    pub const DEFAULT: Self = Self {
        stationary_max_kmh: 1.0,
        flying_min_avg_kmh: 150.0,
        flying_min_max_kmh: 200.0,
        train_min_kmh: 80.0,
        train_max_kmh: 350.0,
        train_max_accel: 0.2,
        train_max_speed_ratio: 1.3,
        walking_max_kmh: 7.0,
        running_cycling_max_kmh: 20.0,
        running_min_accel: 0.25,
        urban_max_kmh: 45.0,
        urban_driving_min_accel: 0.4,
        cycling_max_kmh: 35.0,
        road_max_kmh: 130.0,
        bus_accel_range: (0.2, 0.4),
        motorcycle_min_accel: 0.6,
        fast_max_kmh: 200.0,
    };
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModeClassifier {
    thresholds: ClassifierThresholds,
}

/// Classifies with the default thresholds.
pub fn classify(stats: &MotionStats) -> Classification {
    ModeClassifier::default().classify(stats)
}

impl ModeClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, stats: &MotionStats) -> Classification {
        let avg = stats.avg_speed_kmh;
        let mode = self.mode_for(
            avg,
            stats.max_speed_kmh.unwrap_or(avg),
            stats.avg_acceleration.unwrap_or(0.0).abs(),
        );
        Classification {
            mode,
            confidence: self.confidence_for(mode, avg),
        }
    }

    fn mode_for(&self, avg: f64, max: f64, accel: f64) -> CanonicalMode {
        let t = &self.thresholds;

        if avg <= t.stationary_max_kmh {
            return CanonicalMode::Stationary;
        }
        if avg >= t.flying_min_avg_kmh && max >= t.flying_min_max_kmh {
            return CanonicalMode::Flying;
        }
        if (t.train_min_kmh..=t.train_max_kmh).contains(&avg)
            && accel < t.train_max_accel
            && max / avg < t.train_max_speed_ratio
        {
            return CanonicalMode::Train;
        }

        if avg <= t.walking_max_kmh {
            CanonicalMode::Walking
        } else if avg <= t.running_cycling_max_kmh {
            if accel > t.running_min_accel {
                CanonicalMode::Running
            } else {
                CanonicalMode::Cycling
            }
        } else if avg <= t.urban_max_kmh {
            if accel > t.urban_driving_min_accel {
                CanonicalMode::Driving
            } else if avg <= t.cycling_max_kmh {
                CanonicalMode::Cycling
            } else {
                CanonicalMode::Driving
            }
        } else if avg <= t.road_max_kmh {
            let (bus_min, bus_max) = t.bus_accel_range;
            if (bus_min..=bus_max).contains(&accel) && has_regular_stops() {
                CanonicalMode::Bus
            } else if accel > t.motorcycle_min_accel {
                CanonicalMode::Motorcycle
            } else {
                CanonicalMode::Driving
            }
        } else if avg < t.fast_max_kmh {
            if accel < t.train_max_accel {
                CanonicalMode::Train
            } else {
                CanonicalMode::Driving
            }
        } else {
            CanonicalMode::Unknown
        }
    }

    fn confidence_for(&self, mode: CanonicalMode, avg: f64) -> Confidence {
        let t = &self.thresholds;
        let ambiguous_slow = avg > t.walking_max_kmh && avg <= t.urban_max_kmh;
        let ambiguous_fast = avg > 100.0 && avg < t.fast_max_kmh;

        match mode {
            CanonicalMode::Stationary | CanonicalMode::Flying | CanonicalMode::Walking => {
                Confidence::High
            }
            _ if ambiguous_slow || ambiguous_fast => Confidence::Low,
            _ => Confidence::Medium,
        }
    }
}

/// Stop-and-go pattern that would separate buses from cars.
///
/// No stop detection exists yet, so the bus band never matches.
fn has_regular_stops() -> bool {
    false
}
