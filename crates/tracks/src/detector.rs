//! Per-track transportation mode detection.
//!
//! Provider-reported activity is trusted over inference: the movement analyzer
//! only runs when no sample carries a usable annotation.

use tracing::debug;

use crate::{
    config::{DetectionConfig, PipelineConfig},
    geo_math::DistanceStrategy,
    metrics,
    models::{CanonicalMode, Confidence, ModeSegment, Sample, SegmentSource},
    movement::MovementAnalyzer,
    source_data::SourceDataExtractor,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ModeDetector {
    config: DetectionConfig,
    strategy: DistanceStrategy,
    extractor: SourceDataExtractor,
    analyzer: MovementAnalyzer,
}

impl ModeDetector {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            config: config.detection,
            strategy: config.distance_strategy,
            extractor: SourceDataExtractor::new(config.distance_strategy),
            analyzer: MovementAnalyzer::new(config.movement, config.distance_strategy),
        }
    }

    /// Mode segments for one track's samples, covering every sample.
    pub fn detect(&self, samples: &[Sample]) -> Vec<ModeSegment> {
        if self.should_skip(samples) {
            debug!(samples = samples.len(), "track too short for mode detection");
            return vec![self.default_segment(samples)];
        }

        let from_source = self.extractor.extract(samples);
        if !from_source.is_empty() {
            return from_source;
        }

        let inferred = self.analyzer.analyze(samples);
        if inferred.is_empty() {
            return vec![self.default_segment(samples)];
        }
        inferred
    }

    fn should_skip(&self, samples: &[Sample]) -> bool {
        match (samples.first(), samples.last()) {
            (Some(first), Some(last)) if samples.len() >= self.config.min_points.max(2) => {
                last.timestamp - first.timestamp < self.config.min_track_duration_seconds
            }
            _ => true,
        }
    }

    /// Single low-confidence `unknown` segment carrying the track's own totals.
    fn default_segment(&self, samples: &[Sample]) -> ModeSegment {
        let totals = metrics::measure_track(samples, self.strategy);
        ModeSegment {
            mode: CanonicalMode::Unknown,
            start_index: 0,
            end_index: samples.len().saturating_sub(1),
            distance_m: totals.distance_m,
            duration_s: totals.duration_s,
            avg_speed_kmh: totals.avg_speed_kmh,
            max_speed_kmh: None,
            avg_acceleration: None,
            confidence: Confidence::Low,
            source: SegmentSource::Default,
        }
    }
}
