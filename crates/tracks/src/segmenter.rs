//! Splits a user's unassigned samples into tracks.
//!
//! A new track starts whenever two consecutive samples are too far apart in time
//! or in space. Segmentation is recompute-and-replace: a run describes the
//! region whose previous track assignments the caller should discard, and the
//! tracks that replace them.

use std::ops::Range;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::SegmentationConfig,
    geo_math::DistanceStrategy,
    metrics,
    models::{Sample, Track},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationMode {
    /// Every unassigned sample of the user.
    Bulk,
    /// Only the tail window around one newly recorded sample.
    Incremental,
}

/// Inclusive range of unix timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

/// Result of one segmentation pass for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationRun {
    pub user_id: Uuid,
    pub mode: SegmentationMode,
    /// Region whose prior track assignments must be dropped before storing
    /// `tracks`. Only set when cleanup was requested.
    pub replace: Option<TimeRange>,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrackSegmenter {
    config: SegmentationConfig,
    strategy: DistanceStrategy,
}

impl TrackSegmenter {
    pub fn new(config: SegmentationConfig, strategy: DistanceStrategy) -> Self {
        Self { config, strategy }
    }

    /// Segments all of a user's unassigned samples.
    pub fn bulk(&self, user_id: Uuid, samples: &[Sample], cleanup: bool) -> SegmentationRun {
        let tracks = self.build_tracks(user_id, samples, 0);
        info!(
            %user_id,
            samples = samples.len(),
            tracks = tracks.len(),
            "bulk segmentation finished"
        );
        SegmentationRun {
            user_id,
            mode: SegmentationMode::Bulk,
            replace: cleanup.then(|| span(samples)).flatten(),
            tracks,
        }
    }

    /// Segments the tail window anchored on a newly recorded sample.
    ///
    /// Returns `None` when the anchor is older than the recency cutoff; such
    /// samples are assumed to have been handled by an earlier run. `samples`
    /// must be sorted by timestamp.
    pub fn incremental(
        &self,
        user_id: Uuid,
        samples: &[Sample],
        anchor_timestamp: i64,
        now: OffsetDateTime,
        cleanup: bool,
    ) -> Option<SegmentationRun> {
        let age = now.unix_timestamp() - anchor_timestamp;
        if age > self.config.recency_cutoff_seconds {
            debug!(%user_id, anchor_timestamp, age, "anchor sample too old, skipping");
            return None;
        }

        let window_start = anchor_timestamp - self.config.time_threshold_seconds();
        let offset = samples.partition_point(|s| s.timestamp < window_start);
        let window = &samples[offset..];
        let tracks = self.build_tracks(user_id, window, offset);

        info!(
            %user_id,
            window = window.len(),
            tracks = tracks.len(),
            "incremental segmentation finished"
        );
        Some(SegmentationRun {
            user_id,
            mode: SegmentationMode::Incremental,
            replace: cleanup.then(|| span(window)).flatten(),
            tracks,
        })
    }

    /// Index ranges of consecutive samples that belong together, including
    /// runs too short to become a track.
    pub fn split(&self, samples: &[Sample]) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for (i, window) in samples.windows(2).enumerate() {
            if self.is_break(&window[0], &window[1]) {
                ranges.push(start..i + 1);
                start = i + 1;
            }
        }
        if start < samples.len() {
            ranges.push(start..samples.len());
        }
        ranges
    }

    fn is_break(&self, prev: &Sample, curr: &Sample) -> bool {
        let gap = curr.timestamp - prev.timestamp > self.config.time_threshold_seconds();
        gap || self.strategy.distance(prev.coordinates, curr.coordinates)
            > self.config.distance_threshold_meters
    }

    fn build_tracks(&self, user_id: Uuid, samples: &[Sample], offset: usize) -> Vec<Track> {
        let ranges = self.split(samples);
        let discarded = ranges.iter().filter(|r| r.len() < 2).count();
        if discarded > 0 {
            debug!(%user_id, discarded, "dropped runs with fewer than two samples");
        }

        ranges
            .into_iter()
            .filter(|r| r.len() >= 2)
            .map(|range| {
                let slice = &samples[range.clone()];
                Track {
                    user_id,
                    first_sample: offset + range.start,
                    last_sample: offset + range.end - 1,
                    metrics: metrics::measure_track(slice, self.strategy),
                    samples: slice.to_vec(),
                }
            })
            .collect()
    }
}

fn span(samples: &[Sample]) -> Option<TimeRange> {
    Some(TimeRange {
        start: samples.first()?.timestamp,
        end: samples.last()?.timestamp,
    })
}
