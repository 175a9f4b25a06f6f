//! Integration tests for importing mixed-provider sample records.
//!
//! These tests feed raw JSON records, as the importers store them, through
//! ingestion, segmentation and mode detection, and check the serialized output.

use serde_json::{Value, json};
use tracks::{
    CanonicalMode, PipelineConfig, SegmentSource, TrackProcessor, ingest, models::Confidence,
};
use uuid::Uuid;

const START: i64 = 1_700_000_000;

/// Six Overland walking samples, a two hour gap, then six Google bus samples.
fn mixed_history() -> Value {
    let mut records = Vec::new();
    for i in 0..6 {
        records.push(json!({
            "timestamp": START + i * 60,
            "lat": 48.137 + i as f64 * 0.0008,
            "lon": 11.575,
            "velocity": 1.4,
            "motion_data": { "motion": ["walking"], "activity": "other" }
        }));
    }
    for i in 0..6 {
        records.push(json!({
            "timestamp": START + 7200 + i * 30,
            "lat": 48.2 + i as f64 * 0.003,
            "lon": 11.6,
            "motion_data": {
                "activityRecord": {
                    "probableActivities": [
                        { "type": "IN_BUS", "confidence": 0.7 },
                        { "type": "IN_VEHICLE", "confidence": 0.2 }
                    ]
                }
            }
        }));
    }
    Value::Array(records)
}

fn processor() -> TrackProcessor {
    TrackProcessor::new(&PipelineConfig::default()).unwrap()
}

#[test]
fn test_mixed_provider_history() {
    let json = serde_json::to_vec(&mixed_history()).unwrap();
    let samples = ingest::read_samples(json.as_slice()).unwrap();
    let run = processor().process(Uuid::new_v4(), &samples, true);

    assert_eq!(run.tracks.len(), 2);

    let walk = &run.tracks[0];
    assert_eq!(walk.segments.len(), 1);
    assert_eq!(walk.segments[0].mode, CanonicalMode::Walking);
    assert_eq!(walk.segments[0].source, SegmentSource::Provider("overland"));
    assert_eq!(walk.segments[0].confidence, Confidence::High);

    let bus = &run.tracks[1];
    assert_eq!(bus.track.first_sample, 6);
    assert_eq!(bus.segments[0].mode, CanonicalMode::Bus);
    assert_eq!(bus.segments[0].source, SegmentSource::Provider("google"));
    assert_eq!((bus.segments[0].start_index, bus.segments[0].end_index), (0, 5));
}

#[test]
fn test_output_serialization() {
    let json = serde_json::to_vec(&mixed_history()).unwrap();
    let samples = ingest::read_samples(json.as_slice()).unwrap();
    let run = processor().process(Uuid::from_u128(1), &samples, true);

    let output = serde_json::to_value(&run).unwrap();
    assert_eq!(output["replace"]["start"], START);
    assert_eq!(output["replace"]["end"], START + 7200 + 150);

    let segment = &output["tracks"][1]["segments"][0];
    assert_eq!(segment["mode"], "bus");
    assert_eq!(segment["source"], "google");
    assert_eq!(segment["confidence"], "high");
    assert_eq!(output["tracks"][1]["breakdown"]["bus"]["segments"], 1);
    assert_eq!(output["tracks"][0]["track"]["duration_s"], 300);
    assert!(output["tracks"][0]["track"].get("samples").is_none());
}

#[test]
fn test_records_are_sorted_on_import() {
    let mut history = mixed_history();
    if let Value::Array(records) = &mut history {
        records.reverse();
    }
    let json = serde_json::to_vec(&history).unwrap();
    let samples = ingest::read_samples(json.as_slice()).unwrap();

    assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    let run = processor().process(Uuid::from_u128(2), &samples, false);
    assert_eq!(run.tracks.len(), 2);
    assert_eq!(run.replace, None);
}
