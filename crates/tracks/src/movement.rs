//! Physics-based mode inference for tracks without usable provider data.
//!
//! Works on adjacent sample pairs: each pair gets a distance, speed and
//! acceleration. Boundaries are placed where the smoothed speed jumps, where
//! the recording has a gap, or where acceleration spikes out of calm driving.
//! Segments are then classified and neighbours with the same mode are joined.
//!
//! Everything up to finalization is indexed by pair; [`MovementAnalyzer::analyze`]
//! converts to sample indices once, at the end.

use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::{
    classifier::{MotionStats, ModeClassifier},
    config::MovementConfig,
    geo_math::{self, DistanceStrategy},
    models::{CanonicalMode, Confidence, ModeSegment, Sample, SegmentSource},
};

/// Metrics for one pair of consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMetrics {
    /// Index of the earlier sample; the later one is `from + 1`.
    pub from: usize,
    pub dt_s: i64,
    pub distance_m: f64,
    pub speed_kmh: f64,
    /// Change in speed from the previous pair, m/s².
    pub acceleration: f64,
}

/// A classified stretch of pairs.
#[derive(Debug, Clone, PartialEq)]
struct Stretch {
    pairs: RangeInclusive<usize>,
    distance_m: f64,
    duration_s: i64,
    avg_speed_kmh: f64,
    max_speed_kmh: f64,
    avg_acceleration: f64,
    mode: CanonicalMode,
    confidence: Confidence,
}

impl Stretch {
    /// Joins two neighbouring stretches of the same mode, weighting the
    /// averages by duration.
    fn join(self, next: Stretch) -> Stretch {
        let total = self.duration_s + next.duration_s;
        let weighted = |a: f64, b: f64| {
            if total > 0 {
                (a * self.duration_s as f64 + b * next.duration_s as f64) / total as f64
            } else {
                (a + b) / 2.0
            }
        };
        Stretch {
            pairs: *self.pairs.start()..=*next.pairs.end(),
            distance_m: self.distance_m + next.distance_m,
            duration_s: total,
            avg_speed_kmh: weighted(self.avg_speed_kmh, next.avg_speed_kmh),
            max_speed_kmh: self.max_speed_kmh.max(next.max_speed_kmh),
            avg_acceleration: weighted(self.avg_acceleration, next.avg_acceleration),
            mode: self.mode,
            confidence: self.confidence.min(next.confidence),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MovementAnalyzer {
    config: MovementConfig,
    strategy: DistanceStrategy,
    classifier: ModeClassifier,
}

impl MovementAnalyzer {
    pub fn new(config: MovementConfig, strategy: DistanceStrategy) -> Self {
        Self {
            config,
            strategy,
            classifier: ModeClassifier::default(),
        }
    }

    /// Infers mode segments for `samples`.
    ///
    /// Returns an empty list when no pair of samples is usable.
    pub fn analyze(&self, samples: &[Sample]) -> Vec<ModeSegment> {
        let pairs = self.pair_metrics(samples);
        if pairs.is_empty() {
            if samples.len() >= 2 {
                warn!(samples = samples.len(), "no usable sample pairs, skipping inference");
            }
            return Vec::new();
        }

        let boundaries = self.detect_boundaries(&pairs);
        let ranges = split_at(pairs.len(), &boundaries);
        let ranges = self.merge_short(ranges, &pairs);
        let stretches: Vec<Stretch> = ranges
            .into_iter()
            .map(|range| self.classify_range(range, &pairs))
            .collect();
        let stretches = consolidate(stretches);

        debug!(
            pairs = pairs.len(),
            boundaries = boundaries.len(),
            segments = stretches.len(),
            "inferred mode segments"
        );

        finalize(stretches, &pairs, samples.len())
    }

    /// Per-pair distance, speed and acceleration.
    ///
    /// Pairs with a non-positive time delta or invalid coordinates are skipped.
    /// Speed prefers the later sample's reported velocity.
    pub fn pair_metrics(&self, samples: &[Sample]) -> Vec<PairMetrics> {
        let mut pairs = Vec::with_capacity(samples.len().saturating_sub(1));
        let mut previous_speed_mps: Option<f64> = None;
        let mut skipped = 0usize;

        for (from, window) in samples.windows(2).enumerate() {
            let (a, b) = (&window[0], &window[1]);
            let dt_s = b.timestamp - a.timestamp;
            if dt_s <= 0 || !a.coordinates.is_valid() || !b.coordinates.is_valid() {
                skipped += 1;
                continue;
            }

            let dt = dt_s as f64;
            let distance_m = self.strategy.distance(a.coordinates, b.coordinates);
            let speed_mps = b.reported_velocity().unwrap_or(distance_m / dt);
            let acceleration = previous_speed_mps.map_or(0.0, |prev| (speed_mps - prev) / dt);
            previous_speed_mps = Some(speed_mps);

            pairs.push(PairMetrics {
                from,
                dt_s,
                distance_m,
                speed_kmh: geo_math::mps_to_kmh(speed_mps),
                acceleration,
            });
        }

        if skipped > 0 {
            debug!(skipped, "skipped unusable sample pairs");
        }
        pairs
    }

    /// Pair positions that start a new segment.
    fn detect_boundaries(&self, pairs: &[PairMetrics]) -> Vec<usize> {
        let cfg = &self.config;
        let speeds: Vec<f64> = pairs.iter().map(|p| p.speed_kmh).collect();

        (1..pairs.len())
            .filter(|&i| {
                let gap = pairs[i].dt_s > cfg.gap_threshold_seconds;
                let speed_jump = smoothed_speed_change(&speeds, i, cfg.smoothing_window_size)
                    > cfg.speed_change_threshold_kmh;
                let spike = pairs[i].acceleration.abs() > cfg.acceleration_spike_threshold
                    && pairs[i - 1].acceleration.abs() < cfg.calm_acceleration_threshold;
                gap || speed_jump || spike
            })
            .collect()
    }

    /// Folds segments shorter than the minimum duration into the next one.
    ///
    /// A short tail with nothing after it joins the previous segment instead.
    fn merge_short(
        &self,
        ranges: Vec<RangeInclusive<usize>>,
        pairs: &[PairMetrics],
    ) -> Vec<RangeInclusive<usize>> {
        let min = self.config.min_segment_duration_seconds;
        let duration =
            |r: &RangeInclusive<usize>| -> i64 { pairs[r.clone()].iter().map(|p| p.dt_s).sum() };

        let mut merged: Vec<RangeInclusive<usize>> = Vec::with_capacity(ranges.len());
        let mut pending: Option<RangeInclusive<usize>> = None;

        for range in ranges {
            let range = match pending.take() {
                Some(p) => *p.start()..=*range.end(),
                None => range,
            };
            if duration(&range) < min {
                pending = Some(range);
            } else {
                merged.push(range);
            }
        }

        if let Some(tail) = pending {
            match merged.last_mut() {
                Some(last) => *last = *last.start()..=*tail.end(),
                None => merged.push(tail),
            }
        }
        merged
    }

    fn classify_range(&self, range: RangeInclusive<usize>, pairs: &[PairMetrics]) -> Stretch {
        let slice = &pairs[range.clone()];
        let count = slice.len() as f64;
        let duration_s: i64 = slice.iter().map(|p| p.dt_s).sum();
        let avg_speed_kmh = slice.iter().map(|p| p.speed_kmh).sum::<f64>() / count;
        let max_speed_kmh = slice.iter().map(|p| p.speed_kmh).fold(0.0, f64::max);
        let avg_acceleration = slice.iter().map(|p| p.acceleration.abs()).sum::<f64>() / count;

        let classification = self.classifier.classify(&MotionStats {
            avg_speed_kmh,
            max_speed_kmh: Some(max_speed_kmh),
            avg_acceleration: Some(avg_acceleration),
            duration_s: duration_s as f64,
        });

        Stretch {
            pairs: range,
            distance_m: slice.iter().map(|p| p.distance_m).sum(),
            duration_s,
            avg_speed_kmh,
            max_speed_kmh,
            avg_acceleration,
            mode: classification.mode,
            confidence: classification.confidence,
        }
    }
}

/// Difference between the mean speed just after `i` and just before it.
///
/// The centered smoothing window is split at the candidate boundary, so a
/// clean step in speed is not smeared across several pairs.
fn smoothed_speed_change(speeds: &[f64], i: usize, window: usize) -> f64 {
    let half = (window / 2).max(1);
    let before = &speeds[i.saturating_sub(half)..i];
    let after = &speeds[i..(i + half).min(speeds.len())];
    (mean(after) - mean(before)).abs()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn split_at(len: usize, boundaries: &[usize]) -> Vec<RangeInclusive<usize>> {
    let mut ranges = Vec::with_capacity(boundaries.len() + 1);
    let mut start = 0;
    for &boundary in boundaries {
        ranges.push(start..=boundary - 1);
        start = boundary;
    }
    ranges.push(start..=len - 1);
    ranges
}

fn consolidate(stretches: Vec<Stretch>) -> Vec<Stretch> {
    stretches.into_iter().fold(Vec::new(), |mut out: Vec<Stretch>, stretch| {
        match out.pop() {
            Some(last) if last.mode == stretch.mode => out.push(last.join(stretch)),
            Some(last) => {
                out.push(last);
                out.push(stretch);
            }
            None => out.push(stretch),
        }
        out
    })
}

/// Converts pair-indexed stretches into sample-indexed segments.
///
/// A stretch ends at the later sample of its last pair; the next one starts
/// right after it. The first segment starts at 0 and the last runs to the
/// final sample, so skipped pairs never leave gaps.
fn finalize(
    stretches: Vec<Stretch>,
    pairs: &[PairMetrics],
    sample_count: usize,
) -> Vec<ModeSegment> {
    let last = stretches.len().saturating_sub(1);
    let mut start_index = 0;

    stretches
        .into_iter()
        .enumerate()
        .map(|(k, stretch)| {
            let end_index = if k == last {
                sample_count - 1
            } else {
                pairs[*stretch.pairs.end()].from + 1
            };
            let segment = ModeSegment {
                mode: stretch.mode,
                start_index,
                end_index,
                distance_m: stretch.distance_m,
                duration_s: stretch.duration_s,
                avg_speed_kmh: stretch.avg_speed_kmh,
                max_speed_kmh: Some(stretch.max_speed_kmh),
                avg_acceleration: Some(stretch.avg_acceleration),
                confidence: stretch.confidence,
                source: SegmentSource::Inferred,
            };
            start_index = end_index + 1;
            segment
        })
        .collect()
}
