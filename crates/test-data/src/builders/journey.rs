//! Fluent builder for multi-leg journeys.

use std::ops::Range;

use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracks::{CanonicalMode, Sample, ingest::{self, SampleRecord}};

use super::annotations::motion_payload;
use crate::config::{AnnotationStyle, Region, SamplingConfig};
use crate::profiles::ModeProfile;
use crate::sources::{Cursor, ProceduralGenerator};
use crate::terrain::ElevationGenerator;

/// One leg of a built journey and the records it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegSummary {
    pub mode: CanonicalMode,
    pub records: Range<usize>,
}

/// Records of a generated journey, as an importer would hand them over.
#[derive(Debug, Clone, Serialize)]
pub struct Journey {
    pub records: Vec<SampleRecord>,
    pub legs: Vec<LegSummary>,
}

impl Journey {
    /// Normalized samples, as the pipeline sees them.
    pub fn samples(&self) -> Vec<Sample> {
        ingest::into_samples(self.records.clone())
    }

    /// Leg modes in order, with consecutive repeats collapsed.
    pub fn leg_modes(&self) -> Vec<CanonicalMode> {
        let mut modes: Vec<CanonicalMode> = self.legs.iter().map(|l| l.mode).collect();
        modes.dedup();
        modes
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

/// 2023-11-14T22:13:20Z
const START_TIME: i64 = 1_700_000_000;
/// Initial heading, degrees clockwise from north.
const START_HEADING: f64 = 45.0;

#[derive(Debug, Clone)]
enum Step {
    Leg {
        profile: ModeProfile,
        count: usize,
        annotated: bool,
    },
    Pause(i64),
}

/// Builder for synthetic journeys.
///
/// # Example
///
/// ```rust,ignore
/// let journey = JourneyBuilder::new()
///     .with_seed(7)
///     .annotated(AnnotationStyle::Overland)
///     .leg(CanonicalMode::Walking, 10)
///     .leg(CanonicalMode::Driving, 30)
///     .leg(CanonicalMode::Walking, 5)
///     .build();
/// ```
pub struct JourneyBuilder {
    heading_wander: f64,
    sampling: SamplingConfig,
    annotation: AnnotationStyle,
    hilly: bool,
    seed: u64,
    steps: Vec<Step>,
}

impl Default for JourneyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JourneyBuilder {
    pub fn new() -> Self {
        Self {
            heading_wander: 15.0,
            sampling: SamplingConfig::default(),
            annotation: AnnotationStyle::None,
            hilly: false,
            seed: 42,
            steps: Vec::new(),
        }
    }

    /// Walk to the car, drive across town, walk to the office.
    pub fn commute() -> Self {
        Self::new()
            .with_sampling(SamplingConfig {
                interval_seconds: 20,
                ..Default::default()
            })
            .leg(CanonicalMode::Walking, 10)
            .leg(CanonicalMode::Driving, 30)
            .leg(CanonicalMode::Walking, 8)
    }

    /// Walk to the station, take a regional train, walk on.
    pub fn rail_trip() -> Self {
        Self::new()
            .with_sampling(SamplingConfig {
                interval_seconds: 10,
                ..Default::default()
            })
            .leg(CanonicalMode::Walking, 30)
            .leg(CanonicalMode::Train, 120)
            .leg(CanonicalMode::Walking, 20)
    }

    /// A bike ride out, a long stop, and the ride back after dark.
    pub fn day_out() -> Self {
        Self::new()
            .hilly()
            .with_sampling(SamplingConfig {
                interval_seconds: 30,
                ..Default::default()
            })
            .leg(CanonicalMode::Cycling, 40)
            .leg(CanonicalMode::Stationary, 20)
            .pause(3 * 3600)
            .leg(CanonicalMode::Cycling, 40)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Noise-free samples on a straight line, every `interval_seconds`.
    pub fn exact(mut self, interval_seconds: i64) -> Self {
        self.sampling = SamplingConfig::exact(interval_seconds);
        self.heading_wander = 0.0;
        self
    }

    /// Annotates samples with provider motion data in the given style.
    pub fn annotated(mut self, style: AnnotationStyle) -> Self {
        self.annotation = style;
        self
    }

    /// Uses foothills terrain instead of flat lowland.
    pub fn hilly(mut self) -> Self {
        self.hilly = true;
        self
    }

    /// Adds `count` samples moving as `mode` typically does.
    pub fn leg(self, mode: CanonicalMode, count: usize) -> Self {
        self.leg_with(ModeProfile::for_mode(mode), count)
    }

    /// Adds `count` samples moving according to `profile`, annotated as its mode.
    pub fn leg_with(mut self, profile: ModeProfile, count: usize) -> Self {
        self.steps.push(Step::Leg {
            profile,
            count,
            annotated: true,
        });
        self
    }

    /// Adds a leg whose samples carry no provider annotation.
    pub fn unannotated_leg(mut self, mode: CanonicalMode, count: usize) -> Self {
        self.steps.push(Step::Leg {
            profile: ModeProfile::for_mode(mode),
            count,
            annotated: false,
        });
        self
    }

    /// Stops recording for `seconds`.
    pub fn pause(mut self, seconds: i64) -> Self {
        self.steps.push(Step::Pause(seconds));
        self
    }

    pub fn build(self) -> Journey {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let terrain_seed = self.seed as u32;
        let elevation = if self.hilly {
            ElevationGenerator::hilly(terrain_seed)
        } else {
            ElevationGenerator::flat(terrain_seed)
        };
        let generator = ProceduralGenerator::new(terrain_seed)
            .with_sampling(self.sampling)
            .with_elevation(elevation)
            .with_heading_wander(self.heading_wander);

        let (lat, lon) = Region::MUNICH.random_point(&mut rng);
        let mut cursor = Cursor::new(START_TIME, lat, lon).with_heading(START_HEADING);

        let mut records = Vec::new();
        let mut legs = Vec::new();

        for step in &self.steps {
            match *step {
                Step::Pause(seconds) => cursor.pause(seconds),
                Step::Leg {
                    profile,
                    count,
                    annotated,
                } => {
                    let start = records.len();
                    let style = if annotated {
                        self.annotation
                    } else {
                        AnnotationStyle::None
                    };
                    let samples = generator.generate_leg(&profile, count, &mut cursor, &mut rng);
                    records.extend(samples.into_iter().map(|sample| {
                        let payload = motion_payload(style, profile.mode, sample.timestamp);
                        to_record(sample, payload)
                    }));
                    legs.push(LegSummary {
                        mode: profile.mode,
                        records: start..records.len(),
                    });
                }
            }
        }

        tracing::debug!(
            records = records.len(),
            legs = legs.len(),
            seed = self.seed,
            "journey built"
        );
        Journey { records, legs }
    }
}

fn to_record(sample: Sample, motion_data: Option<serde_json::Value>) -> SampleRecord {
    SampleRecord {
        timestamp: sample.timestamp,
        lat: sample.coordinates.lat,
        lon: sample.coordinates.lon,
        velocity: sample.velocity,
        altitude: sample.altitude,
        motion_data,
        normalized_motion: None,
    }
}
