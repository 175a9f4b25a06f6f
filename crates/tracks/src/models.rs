use std::fmt;

use enum_map::Enum;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::annotation::ProviderAnnotation;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the WGS84 lat/lon ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// One raw timestamped location reading. Never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    pub coordinates: Coordinates,
    /// Reported velocity in m/s.
    pub velocity: Option<f64>,
    /// Altitude in meters.
    pub altitude: Option<f64>,
    pub annotation: ProviderAnnotation,
}

impl Sample {
    pub fn new(timestamp: i64, lat: f64, lon: f64) -> Self {
        Self {
            timestamp,
            coordinates: Coordinates::new(lat, lon),
            velocity: None,
            altitude: None,
            annotation: ProviderAnnotation::None,
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_annotation(mut self, annotation: ProviderAnnotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Reported velocity when it is usable (finite and non-negative).
    ///
    /// Some providers report `-1` for "no fix"; those are treated as absent.
    pub fn reported_velocity(&self) -> Option<f64> {
        self.velocity.filter(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Fixed set of transportation modes every provider vocabulary maps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalMode {
    Stationary,
    Walking,
    Running,
    Cycling,
    Driving,
    Motorcycle,
    Bus,
    Train,
    Boat,
    Flying,
    Unknown,
}

impl CanonicalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalMode::Stationary => "stationary",
            CanonicalMode::Walking => "walking",
            CanonicalMode::Running => "running",
            CanonicalMode::Cycling => "cycling",
            CanonicalMode::Driving => "driving",
            CanonicalMode::Motorcycle => "motorcycle",
            CanonicalMode::Bus => "bus",
            CanonicalMode::Train => "train",
            CanonicalMode::Boat => "boat",
            CanonicalMode::Flying => "flying",
            CanonicalMode::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CanonicalMode::Unknown)
    }
}

impl fmt::Display for CanonicalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative reliability of a mode assignment. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Provenance label of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentSource {
    /// Detection was skipped (too few samples or too short).
    Default,
    /// Classified from speed and acceleration.
    Inferred,
    /// Taken from provider-supplied activity data.
    Provider(&'static str),
}

impl SegmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentSource::Default => "default",
            SegmentSource::Inferred => "inferred",
            SegmentSource::Provider(name) => name,
        }
    }
}

impl fmt::Display for SegmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SegmentSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A sub-range of a track's samples tagged with one transportation mode.
///
/// `start_index` and `end_index` are inclusive and address the track's samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSegment {
    pub mode: CanonicalMode,
    pub start_index: usize,
    pub end_index: usize,
    pub distance_m: f64,
    pub duration_s: i64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: Option<f64>,
    pub avg_acceleration: Option<f64>,
    pub confidence: Confidence,
    pub source: SegmentSource,
}

impl ModeSegment {
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Aggregates derived from a track's samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TrackMetrics {
    pub start_time: i64,
    pub end_time: i64,
    pub distance_m: f64,
    pub duration_s: i64,
    pub avg_speed_kmh: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
}

/// A contiguous run of one user's samples bounded by inactivity or distance gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub user_id: Uuid,
    /// Inclusive index range of this track's samples in the segmented batch.
    pub first_sample: usize,
    pub last_sample: usize,
    #[serde(flatten)]
    pub metrics: TrackMetrics,
    #[serde(skip)]
    pub samples: Vec<Sample>,
}

impl Track {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Checks that `segments` cover `[0, sample_count - 1]` in order with no gaps or overlaps.
pub fn segments_are_contiguous(segments: &[ModeSegment], sample_count: usize) -> bool {
    let Some(first) = segments.first() else {
        return sample_count == 0;
    };
    if first.start_index != 0 {
        return false;
    }
    let last_index = sample_count.saturating_sub(1);
    let mut expected_start = 0;
    for segment in segments {
        if segment.start_index != expected_start || segment.end_index < segment.start_index {
            return false;
        }
        expected_start = segment.end_index + 1;
    }
    segments.last().is_some_and(|s| s.end_index == last_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: usize, end: usize) -> ModeSegment {
        ModeSegment {
            mode: CanonicalMode::Walking,
            start_index: start,
            end_index: end,
            distance_m: 0.0,
            duration_s: 0,
            avg_speed_kmh: 0.0,
            max_speed_kmh: None,
            avg_acceleration: None,
            confidence: Confidence::High,
            source: SegmentSource::Inferred,
        }
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
        assert_eq!(Confidence::High.min(Confidence::Low), Confidence::Low);
    }

    #[test]
    fn test_source_serializes_as_label() {
        let json = serde_json::to_string(&SegmentSource::Provider("overland")).unwrap();
        assert_eq!(json, "\"overland\"");
        let json = serde_json::to_string(&SegmentSource::Default).unwrap();
        assert_eq!(json, "\"default\"");
    }

    #[test]
    fn test_contiguity_check() {
        assert!(segments_are_contiguous(&[segment(0, 3), segment(4, 9)], 10));
        assert!(!segments_are_contiguous(&[segment(0, 3), segment(5, 9)], 10));
        assert!(!segments_are_contiguous(&[segment(0, 4), segment(4, 9)], 10));
        assert!(!segments_are_contiguous(&[segment(0, 3), segment(4, 8)], 10));
        assert!(!segments_are_contiguous(&[], 3));
    }

    #[test]
    fn test_reported_velocity_filters_sentinels() {
        let sample = Sample::new(0, 52.0, 13.0).with_velocity(-1.0);
        assert_eq!(sample.reported_velocity(), None);
        let sample = Sample::new(0, 52.0, 13.0).with_velocity(2.5);
        assert_eq!(sample.reported_velocity(), Some(2.5));
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(Coordinates::new(52.5, 13.4).is_valid());
        assert!(!Coordinates::new(f64::NAN, 13.4).is_valid());
        assert!(!Coordinates::new(95.0, 13.4).is_valid());
    }
}
