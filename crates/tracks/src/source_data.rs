//! Mode segments from provider-supplied activity annotations.
//!
//! Samples are tagged individually, grouped into runs of the same mode, and runs
//! of unknown samples are folded into their known neighbours. Segment statistics
//! are recomputed from the samples afterwards.

use tracing::debug;

use crate::{
    geo_math::{self, DistanceStrategy},
    metrics,
    models::{CanonicalMode, Confidence, ModeSegment, Sample, SegmentSource},
};

/// Run of consecutive samples sharing one mode, in sample indices.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Run {
    mode: CanonicalMode,
    start: usize,
    end: usize,
    source: Option<&'static str>,
    confidence: Confidence,
}

impl Run {
    fn absorb(self, other: Run) -> Run {
        Run {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            confidence: self.confidence.min(other.confidence),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceDataExtractor {
    strategy: DistanceStrategy,
}

impl SourceDataExtractor {
    pub fn new(strategy: DistanceStrategy) -> Self {
        Self { strategy }
    }

    /// Returns no segments when no sample carries a usable annotation.
    pub fn extract(&self, samples: &[Sample]) -> Vec<ModeSegment> {
        let tagged: Vec<_> = samples.iter().map(|s| s.annotation.mode()).collect();
        if tagged.iter().all(|(mode, _)| !mode.is_known()) {
            return Vec::new();
        }

        let runs = group_runs(&tagged);
        let filled = fill_unknown_runs(runs);
        let merged = merge_same_mode(filled);
        debug!(
            samples = samples.len(),
            segments = merged.len(),
            "extracted segments from provider annotations"
        );

        merged
            .into_iter()
            .map(|run| self.finalize(run, samples))
            .collect()
    }

    fn finalize(&self, run: Run, samples: &[Sample]) -> ModeSegment {
        let slice = &samples[run.start..=run.end];
        let distance_m = metrics::path_distance(slice, self.strategy);
        let duration_s = slice[slice.len() - 1].timestamp - slice[0].timestamp;
        let max_speed_kmh = slice
            .iter()
            .filter_map(Sample::reported_velocity)
            .map(geo_math::mps_to_kmh)
            .reduce(f64::max);

        ModeSegment {
            mode: run.mode,
            start_index: run.start,
            end_index: run.end,
            distance_m,
            duration_s,
            avg_speed_kmh: geo_math::avg_speed_kmh(distance_m, duration_s as f64),
            max_speed_kmh,
            avg_acceleration: None,
            confidence: run.confidence,
            source: run
                .source
                .map_or(SegmentSource::Default, SegmentSource::Provider),
        }
    }
}

fn group_runs(tagged: &[(CanonicalMode, Option<&'static str>)]) -> Vec<Run> {
    tagged
        .iter()
        .enumerate()
        .fold(Vec::new(), |mut runs: Vec<Run>, (index, &(mode, source))| {
            match runs.last_mut() {
                Some(last) if last.mode == mode => {
                    last.end = index;
                    last.source = last.source.or(source);
                }
                _ => runs.push(Run {
                    mode,
                    start: index,
                    end: index,
                    source,
                    confidence: if mode.is_known() {
                        Confidence::High
                    } else {
                        Confidence::Low
                    },
                }),
            }
            runs
        })
}

/// Folds each unknown run into the preceding known run, or into the following
/// one when it leads the track. Absorbing runs drop to medium confidence.
fn fill_unknown_runs(runs: Vec<Run>) -> Vec<Run> {
    if runs.iter().all(|r| !r.mode.is_known()) {
        return runs;
    }

    let mut filled: Vec<Run> = Vec::with_capacity(runs.len());
    let mut leading_unknown: Option<Run> = None;

    for run in runs {
        if run.mode.is_known() {
            let run = match leading_unknown.take() {
                Some(unknown) => Run {
                    start: unknown.start,
                    confidence: run.confidence.min(Confidence::Medium),
                    ..run
                },
                None => run,
            };
            filled.push(run);
        } else if let Some(previous) = filled.last_mut() {
            previous.end = run.end;
            previous.confidence = previous.confidence.min(Confidence::Medium);
        } else {
            leading_unknown = Some(match leading_unknown {
                Some(pending) => pending.absorb(run),
                None => run,
            });
        }
    }
    filled
}

/// Joins adjacent runs of the same mode, keeping the lower confidence.
fn merge_same_mode(runs: Vec<Run>) -> Vec<Run> {
    runs.into_iter().fold(Vec::new(), |mut merged: Vec<Run>, run| {
        match merged.last_mut() {
            Some(last) if last.mode == run.mode => *last = last.absorb(run),
            _ => merged.push(run),
        }
        merged
    })
}
