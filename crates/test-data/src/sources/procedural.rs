//! Procedural sample generation.

use geo::{Destination, Haversine, Point};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracks::Sample;

use crate::config::SamplingConfig;
use crate::profiles::{self, ModeProfile};
use crate::terrain::{ElevationGenerator, add_elevation_jitter};

/// Position, heading and clock carried from one leg to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub timestamp: i64,
    pub lat: f64,
    pub lon: f64,
    /// Heading in degrees clockwise from north.
    pub heading: f64,
    /// Whether a sample has been emitted at the current position already.
    started: bool,
}

impl Cursor {
    pub fn new(timestamp: i64, lat: f64, lon: f64) -> Self {
        Self {
            timestamp,
            lat,
            lon,
            heading: 0.0,
            started: false,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    /// Jumps the clock forward without moving, e.g. a phone switched off.
    pub fn pause(&mut self, seconds: i64) {
        self.timestamp += seconds;
    }
}

/// Generates synthetic location samples for one mode at a time.
pub struct ProceduralGenerator {
    sampling: SamplingConfig,
    elevation: ElevationGenerator,
    /// Maximum heading change per step in degrees.
    heading_wander: f64,
}

impl ProceduralGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            sampling: SamplingConfig::default(),
            elevation: ElevationGenerator::flat(seed),
            heading_wander: 15.0,
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_elevation(mut self, elevation: ElevationGenerator) -> Self {
        self.elevation = elevation;
        self
    }

    /// Sets how far the heading may drift between samples; 0 walks a straight line.
    pub fn with_heading_wander(mut self, degrees: f64) -> Self {
        self.heading_wander = degrees.abs();
        self
    }

    /// Generates `count` samples moving according to `profile`, advancing `cursor`.
    ///
    /// Each sample reports the speed it was reached with, so the first sample of
    /// a leg already carries the new mode's speed.
    pub fn generate_leg(
        &self,
        profile: &ModeProfile,
        count: usize,
        cursor: &mut Cursor,
        rng: &mut impl Rng,
    ) -> Vec<Sample> {
        let interval = self.sampling.interval_seconds.max(1);
        let mut samples = Vec::with_capacity(count);

        for _ in 0..count {
            let variance = profiles::sample_variance(profile, rng);
            let grade = self.grade_ahead(cursor, profile.base_speed_mps * interval as f64);
            let speed = profiles::speed_at_grade(profile, grade, variance);

            if cursor.started {
                if self.heading_wander > 0.0 {
                    cursor.heading = (cursor.heading
                        + rng.gen_range(-self.heading_wander..=self.heading_wander))
                    .rem_euclid(360.0);
                }
                let step_m = speed * interval as f64;
                if step_m > 0.0 {
                    let here = Point::new(cursor.lon, cursor.lat);
                    let next = Haversine.destination(here, cursor.heading, step_m);
                    cursor.lat = next.y();
                    cursor.lon = next.x();
                }
                cursor.timestamp += interval;
            }
            cursor.started = true;

            samples.push(self.observe(cursor, speed, rng));
        }

        samples
    }

    /// Grade of the terrain over the next step along the current heading.
    fn grade_ahead(&self, cursor: &Cursor, step_m: f64) -> f64 {
        if step_m <= 0.0 {
            return 0.0;
        }
        let here = Point::new(cursor.lon, cursor.lat);
        let ahead = Haversine.destination(here, cursor.heading, step_m);
        let rise = self.elevation.elevation_at(ahead.y(), ahead.x())
            - self.elevation.elevation_at(cursor.lat, cursor.lon);
        rise / step_m
    }

    /// What a receiver at the cursor would record.
    fn observe(&self, cursor: &Cursor, speed: f64, rng: &mut impl Rng) -> Sample {
        let (lat, lon) = jitter_position(cursor.lat, cursor.lon, self.sampling.gps_jitter_m, rng);
        let altitude = add_elevation_jitter(
            self.elevation.elevation_at(cursor.lat, cursor.lon),
            rng,
            self.sampling.altitude_jitter_m,
        );

        let sample = Sample::new(cursor.timestamp, lat, lon).with_altitude(altitude);
        if self.sampling.report_velocity {
            sample.with_velocity(speed)
        } else {
            sample
        }
    }
}

/// Offsets a position by normally distributed noise of `std_dev_m` meters.
fn jitter_position(lat: f64, lon: f64, std_dev_m: f64, rng: &mut impl Rng) -> (f64, f64) {
    if std_dev_m <= 0.0 {
        return (lat, lon);
    }
    let Ok(normal) = Normal::new(0.0, std_dev_m / 111_000.0) else {
        return (lat, lon);
    };
    let lon_scale = lat.to_radians().cos().max(0.01);
    (
        lat + normal.sample(rng),
        lon + normal.sample(rng) / lon_scale,
    )
}
