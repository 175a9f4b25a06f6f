use crate::{
    geo_math::{self, DistanceStrategy},
    models::{Coordinates, Sample, TrackMetrics},
};

/// Streaming accumulator fed one sample at a time.
pub trait TrackMetric {
    type Score;
    fn next_sample(&mut self, sample: &Sample);
    fn finish(&mut self) -> Self::Score;
}

/// Computes all track-level aggregates in one pass.
pub fn measure_track(samples: &[Sample], strategy: DistanceStrategy) -> TrackMetrics {
    let mut acc = Metrics::new(strategy);
    for sample in samples {
        acc.next_sample(sample);
    }
    acc.finish()
}

/// Sum of consecutive pairwise distances over `samples`.
pub fn path_distance(samples: &[Sample], strategy: DistanceStrategy) -> f64 {
    let mut distance = DistanceMetric::new(strategy);
    for sample in samples {
        distance.next_sample(sample);
    }
    distance.finish()
}

#[derive(Debug, Clone)]
struct Metrics {
    distance: DistanceMetric,
    duration: DurationMetric,
    elevation: ElevationMetric,
}

impl Metrics {
    fn new(strategy: DistanceStrategy) -> Self {
        Self {
            distance: DistanceMetric::new(strategy),
            duration: DurationMetric::default(),
            elevation: ElevationMetric::default(),
        }
    }
}

impl TrackMetric for Metrics {
    type Score = TrackMetrics;

    fn next_sample(&mut self, sample: &Sample) {
        self.distance.next_sample(sample);
        self.duration.next_sample(sample);
        self.elevation.next_sample(sample);
    }

    fn finish(&mut self) -> TrackMetrics {
        let distance_m = self.distance.finish();
        let (start_time, end_time) = self.duration.finish();
        let duration_s = end_time - start_time;
        let (elevation_gain_m, elevation_loss_m) = self.elevation.finish();
        TrackMetrics {
            start_time,
            end_time,
            distance_m,
            duration_s,
            avg_speed_kmh: geo_math::avg_speed_kmh(distance_m, duration_s as f64),
            elevation_gain_m,
            elevation_loss_m,
        }
    }
}

#[derive(Debug, Clone)]
struct DistanceMetric {
    strategy: DistanceStrategy,
    total_distance: f64,
    last_point: Option<Coordinates>,
}

impl DistanceMetric {
    fn new(strategy: DistanceStrategy) -> Self {
        Self {
            strategy,
            total_distance: 0.0,
            last_point: None,
        }
    }
}

impl TrackMetric for DistanceMetric {
    type Score = f64;

    fn next_sample(&mut self, sample: &Sample) {
        let current = sample.coordinates;
        if !current.is_valid() {
            return;
        }
        self.total_distance += self
            .last_point
            .map_or(0.0, |prev| self.strategy.distance(prev, current));
        self.last_point = Some(current);
    }

    fn finish(&mut self) -> f64 {
        self.total_distance
    }
}

#[derive(Debug, Clone, Default)]
struct DurationMetric {
    start_time: Option<i64>,
    end_time: Option<i64>,
}

impl TrackMetric for DurationMetric {
    /// `(start, end)` timestamps; `(0, 0)` for an empty track.
    type Score = (i64, i64);

    fn next_sample(&mut self, sample: &Sample) {
        if self.start_time.is_none() {
            self.start_time = Some(sample.timestamp);
        }
        self.end_time = Some(sample.timestamp);
    }

    fn finish(&mut self) -> (i64, i64) {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (start, end),
            _ => (0, 0),
        }
    }
}

/// Gain and loss over consecutive samples that both carry an altitude.
#[derive(Debug, Clone, Default)]
struct ElevationMetric {
    total_gain: f64,
    total_loss: f64,
    last_altitude: Option<f64>,
}

impl TrackMetric for ElevationMetric {
    type Score = (f64, f64);

    fn next_sample(&mut self, sample: &Sample) {
        let altitude = sample.altitude.filter(|a| a.is_finite());
        if let (Some(prev), Some(curr)) = (self.last_altitude, altitude) {
            let diff = curr - prev;
            if diff > 0.0 {
                self.total_gain += diff;
            } else {
                self.total_loss += diff.abs();
            }
        }
        self.last_altitude = altitude;
    }

    fn finish(&mut self) -> (f64, f64) {
        (self.total_gain, self.total_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, spacing_s: i64) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(i as i64 * spacing_s, 52.0 + i as f64 * 0.001, 13.0))
            .collect()
    }

    #[test]
    fn test_measure_track_distance_and_speed() {
        let samples = line(11, 10);
        let metrics = measure_track(&samples, DistanceStrategy::Haversine);
        // 10 steps of ~111 m over 100 s
        assert!((metrics.distance_m - 1112.0).abs() < 5.0, "{}", metrics.distance_m);
        assert_eq!(metrics.duration_s, 100);
        assert_eq!(metrics.start_time, 0);
        assert_eq!(metrics.end_time, 100);
        assert!((metrics.avg_speed_kmh - 40.0).abs() < 0.5);
    }

    #[test]
    fn test_zero_duration_has_zero_speed() {
        let samples = vec![Sample::new(5, 52.0, 13.0), Sample::new(5, 52.001, 13.0)];
        let metrics = measure_track(&samples, DistanceStrategy::Haversine);
        assert_eq!(metrics.duration_s, 0);
        assert_eq!(metrics.avg_speed_kmh, 0.0);
    }

    #[test]
    fn test_elevation_gain_and_loss() {
        let samples = vec![
            Sample::new(0, 52.0, 13.0).with_altitude(100.0),
            Sample::new(10, 52.0, 13.0).with_altitude(110.0),
            Sample::new(20, 52.0, 13.0).with_altitude(104.0),
            Sample::new(30, 52.0, 13.0),
            Sample::new(40, 52.0, 13.0).with_altitude(150.0),
            Sample::new(50, 52.0, 13.0).with_altitude(152.0),
        ];
        let metrics = measure_track(&samples, DistanceStrategy::Haversine);
        assert!((metrics.elevation_gain_m - 12.0).abs() < 1e-9);
        assert!((metrics.elevation_loss_m - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_altitude_data() {
        let metrics = measure_track(&line(3, 10), DistanceStrategy::Haversine);
        assert_eq!(metrics.elevation_gain_m, 0.0);
        assert_eq!(metrics.elevation_loss_m, 0.0);
    }
}
