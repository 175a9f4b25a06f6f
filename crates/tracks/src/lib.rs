//! Track segmentation and transportation mode detection.
//!
//! A user's raw location samples are split into tracks by time and distance
//! gaps; each track is then partitioned into mode segments. Provider-reported
//! activity is used when present, speed and acceleration otherwise.
//!
//! Everything here is pure computation over in-memory samples: persistence,
//! scheduling and file import live with the callers.

pub mod annotation;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod errors;
pub mod geo_math;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod movement;
pub mod pipeline;
pub mod segmenter;
pub mod source_data;
pub mod vocabulary;

pub use crate::{
    annotation::ProviderAnnotation,
    classifier::{Classification, MotionStats, classify},
    config::PipelineConfig,
    detector::ModeDetector,
    models::{CanonicalMode, Confidence, ModeSegment, Sample, SegmentSource, Track},
    pipeline::{ProcessedRun, ProcessedTrack, TrackProcessor},
    segmenter::TrackSegmenter,
};
