//! Tunable thresholds for segmentation, movement analysis, and mode detection.
//!
//! Every value has a default. Overrides come from `TRACKS_*` environment variables
//! or a JSON document; both paths are validated before use.

use std::{env, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{errors::ConfigError, geo_math::DistanceStrategy};

/// Track boundary thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SegmentationConfig {
    /// A gap longer than this between consecutive samples starts a new track.
    #[validate(range(
        min = 1,
        max = 10_080,
        message = "time_threshold_minutes must be between 1 and 10080 (one week)"
    ))]
    pub time_threshold_minutes: i64,
    /// A jump farther than this between consecutive samples starts a new track.
    #[validate(range(min = 1.0, message = "distance_threshold_meters must be at least 1"))]
    pub distance_threshold_meters: f64,
    /// Incremental runs skip anchors older than this, relative to now.
    #[validate(range(min = 0, message = "recency_cutoff_seconds must not be negative"))]
    pub recency_cutoff_seconds: i64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            time_threshold_minutes: 60,
            distance_threshold_meters: 500.0,
            recency_cutoff_seconds: 3600,
        }
    }
}

impl SegmentationConfig {
    pub fn time_threshold_seconds(&self) -> i64 {
        self.time_threshold_minutes * 60
    }
}

/// Movement analysis thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MovementConfig {
    #[validate(range(min = 1, message = "gap_threshold_seconds must be at least 1"))]
    pub gap_threshold_seconds: i64,
    #[validate(range(min = 0.0, message = "speed_change_threshold_kmh must not be negative"))]
    pub speed_change_threshold_kmh: f64,
    #[validate(range(min = 0.0, message = "acceleration_spike_threshold must not be negative"))]
    pub acceleration_spike_threshold: f64,
    /// Previous-pair acceleration below this counts as calm for spike detection.
    #[validate(range(min = 0.0, message = "calm_acceleration_threshold must not be negative"))]
    pub calm_acceleration_threshold: f64,
    #[validate(range(min = 0, message = "min_segment_duration_seconds must not be negative"))]
    pub min_segment_duration_seconds: i64,
    #[validate(range(min = 1, message = "smoothing_window_size must be at least 1"))]
    pub smoothing_window_size: usize,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            gap_threshold_seconds: 180,
            speed_change_threshold_kmh: 25.0,
            acceleration_spike_threshold: 3.0,
            calm_acceleration_threshold: 0.3,
            min_segment_duration_seconds: 60,
            smoothing_window_size: 5,
        }
    }
}

/// When mode detection is skipped in favor of a single default segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DetectionConfig {
    #[validate(range(min = 2, message = "min_points must be at least 2"))]
    pub min_points: usize,
    #[validate(range(min = 0, message = "min_track_duration_seconds must not be negative"))]
    pub min_track_duration_seconds: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_points: 2,
            min_track_duration_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    #[validate(nested)]
    pub segmentation: SegmentationConfig,
    #[validate(nested)]
    pub movement: MovementConfig,
    #[validate(nested)]
    pub detection: DetectionConfig,
    pub distance_strategy: DistanceStrategy,
    /// Worker threads for batch processing; `None` uses one per core.
    #[validate(range(min = 1, message = "worker_threads must be at least 1"))]
    pub worker_threads: Option<usize>,
}

impl PipelineConfig {
    /// Loads overrides from `TRACKS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from defaults, applying any value `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let seg = &mut config.segmentation;
        override_from(&lookup, "TRACKS_TIME_THRESHOLD_MINUTES", &mut seg.time_threshold_minutes)?;
        override_from(
            &lookup,
            "TRACKS_DISTANCE_THRESHOLD_METERS",
            &mut seg.distance_threshold_meters,
        )?;
        override_from(&lookup, "TRACKS_RECENCY_CUTOFF_SECONDS", &mut seg.recency_cutoff_seconds)?;

        let mv = &mut config.movement;
        override_from(&lookup, "TRACKS_GAP_THRESHOLD_SECONDS", &mut mv.gap_threshold_seconds)?;
        override_from(
            &lookup,
            "TRACKS_SPEED_CHANGE_THRESHOLD_KMH",
            &mut mv.speed_change_threshold_kmh,
        )?;
        override_from(
            &lookup,
            "TRACKS_ACCELERATION_SPIKE_THRESHOLD",
            &mut mv.acceleration_spike_threshold,
        )?;
        override_from(
            &lookup,
            "TRACKS_CALM_ACCELERATION_THRESHOLD",
            &mut mv.calm_acceleration_threshold,
        )?;
        override_from(
            &lookup,
            "TRACKS_MIN_SEGMENT_DURATION_SECONDS",
            &mut mv.min_segment_duration_seconds,
        )?;
        override_from(&lookup, "TRACKS_SMOOTHING_WINDOW_SIZE", &mut mv.smoothing_window_size)?;

        let det = &mut config.detection;
        override_from(&lookup, "TRACKS_MIN_POINTS", &mut det.min_points)?;
        override_from(
            &lookup,
            "TRACKS_MIN_TRACK_DURATION_SECONDS",
            &mut det.min_track_duration_seconds,
        )?;

        if let Some(value) = lookup("TRACKS_DISTANCE_STRATEGY") {
            config.distance_strategy = match value.trim().to_ascii_lowercase().as_str() {
                "haversine" => DistanceStrategy::Haversine,
                "geodesic" => DistanceStrategy::Geodesic,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "TRACKS_DISTANCE_STRATEGY",
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup("TRACKS_WORKER_THREADS") {
            let threads = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "TRACKS_WORKER_THREADS",
                value: value.clone(),
            })?;
            config.worker_threads = Some(threads);
        }

        config.validate()?;
        Ok(config)
    }
}

fn override_from<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name, value })?;
    }
    Ok(())
}
