//! End-to-end processing: tracks first, then mode segments per track.
//!
//! Track processing is pure and independent per track, so batches fan out over a
//! rayon pool with no coordination beyond splitting the work.

use std::sync::Arc;

use enum_map::EnumMap;
use rayon::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    config::PipelineConfig,
    detector::ModeDetector,
    models::{CanonicalMode, ModeSegment, Sample, Track},
    segmenter::{SegmentationRun, TimeRange, TrackSegmenter},
};

/// Distance and time spent per mode within one track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeBreakdown {
    totals: EnumMap<CanonicalMode, ModeTotals>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ModeTotals {
    pub distance_m: f64,
    pub duration_s: i64,
    pub segments: usize,
}

impl ModeBreakdown {
    pub fn from_segments(segments: &[ModeSegment]) -> Self {
        let mut totals: EnumMap<CanonicalMode, ModeTotals> = EnumMap::default();
        for segment in segments {
            let entry = &mut totals[segment.mode];
            entry.distance_m += segment.distance_m;
            entry.duration_s += segment.duration_s;
            entry.segments += 1;
        }
        Self { totals }
    }

    pub fn get(&self, mode: CanonicalMode) -> ModeTotals {
        self.totals[mode]
    }

    /// Mode with the most time spent; ties go to the longer distance.
    pub fn dominant_mode(&self) -> Option<CanonicalMode> {
        self.totals
            .iter()
            .filter(|(_, t)| t.segments > 0)
            .max_by(|(_, a), (_, b)| {
                a.duration_s
                    .cmp(&b.duration_s)
                    .then(a.distance_m.total_cmp(&b.distance_m))
            })
            .map(|(mode, _)| mode)
    }

    /// Modes that occur, in enum order.
    pub fn entries(&self) -> Vec<(CanonicalMode, ModeTotals)> {
        self.totals
            .iter()
            .filter(|(_, t)| t.segments > 0)
            .map(|(mode, t)| (mode, *t))
            .collect()
    }
}

impl Serialize for ModeBreakdown {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (mode, totals) in entries {
            map.serialize_entry(mode.as_str(), &totals)?;
        }
        map.end()
    }
}

/// A track together with its mode segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedTrack {
    pub track: Track,
    pub segments: Vec<ModeSegment>,
    pub breakdown: ModeBreakdown,
}

/// Output of one pipeline run for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedRun {
    pub user_id: Uuid,
    pub replace: Option<TimeRange>,
    pub tracks: Vec<ProcessedTrack>,
}

/// One user's unassigned samples, queued for batch processing.
#[derive(Debug, Clone)]
pub struct UserBatch {
    pub user_id: Uuid,
    pub samples: Vec<Sample>,
}

#[derive(Clone)]
pub struct TrackProcessor {
    segmenter: TrackSegmenter,
    detector: ModeDetector,
    pool: Arc<rayon::ThreadPool>,
}

impl TrackProcessor {
    pub fn new(config: &PipelineConfig) -> Result<Self, rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("tracks-worker-{i}"));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        Ok(Self {
            segmenter: TrackSegmenter::new(config.segmentation, config.distance_strategy),
            detector: ModeDetector::new(config),
            pool: Arc::new(builder.build()?),
        })
    }

    /// Mode segments for a single already-built track.
    pub fn detect(&self, track: Track) -> ProcessedTrack {
        let segments = self.detector.detect(&track.samples);
        let breakdown = ModeBreakdown::from_segments(&segments);
        ProcessedTrack {
            track,
            segments,
            breakdown,
        }
    }

    /// Bulk-segments a user's samples and detects modes for every track.
    pub fn process(&self, user_id: Uuid, samples: &[Sample], cleanup: bool) -> ProcessedRun {
        let run = self.segmenter.bulk(user_id, samples, cleanup);
        self.detect_run(run)
    }

    /// Incremental variant of [`process`](Self::process); `None` when the
    /// anchor sample is past the recency cutoff.
    pub fn process_incremental(
        &self,
        user_id: Uuid,
        samples: &[Sample],
        anchor_timestamp: i64,
        now: OffsetDateTime,
        cleanup: bool,
    ) -> Option<ProcessedRun> {
        self.segmenter
            .incremental(user_id, samples, anchor_timestamp, now, cleanup)
            .map(|run| self.detect_run(run))
    }

    /// Processes many users on the worker pool. Output order matches input order.
    pub fn process_batch(&self, batches: Vec<UserBatch>, cleanup: bool) -> Vec<ProcessedRun> {
        let users = batches.len();
        let runs: Vec<ProcessedRun> = self.pool.install(|| {
            batches
                .into_par_iter()
                .map(|batch| self.process(batch.user_id, &batch.samples, cleanup))
                .collect()
        });
        info!(
            users,
            tracks = runs.iter().map(|r| r.tracks.len()).sum::<usize>(),
            "batch processed"
        );
        runs
    }

    fn detect_run(&self, run: SegmentationRun) -> ProcessedRun {
        let SegmentationRun {
            user_id,
            replace,
            tracks,
            ..
        } = run;
        let tracks: Vec<ProcessedTrack> = self.pool.install(|| {
            tracks
                .into_par_iter()
                .map(|track| self.detect(track))
                .collect()
        });
        ProcessedRun {
            user_id,
            replace,
            tracks,
        }
    }
}
