//! End-to-end scenarios: generated journeys through segmentation and mode detection.

use test_data::prelude::*;
use time::OffsetDateTime;
use tracks::models::{Confidence, SegmentSource, segments_are_contiguous};
use tracks::pipeline::UserBatch;
use tracks::{ModeDetector, PipelineConfig, ProcessedRun, TrackProcessor};
use uuid::Uuid;

fn user() -> Uuid {
    Uuid::from_u128(0xfeed)
}

fn processor() -> TrackProcessor {
    let config = PipelineConfig {
        worker_threads: Some(2),
        ..Default::default()
    };
    TrackProcessor::new(&config).unwrap()
}

fn modes(run: &ProcessedRun, track: usize) -> Vec<CanonicalMode> {
    run.tracks[track].segments.iter().map(|s| s.mode).collect()
}

fn assert_contiguous(run: &ProcessedRun) {
    for processed in &run.tracks {
        assert!(
            segments_are_contiguous(&processed.segments, processed.track.sample_count()),
            "segments {:?} do not cover {} samples",
            processed
                .segments
                .iter()
                .map(|s| (s.start_index, s.end_index))
                .collect::<Vec<_>>(),
            processed.track.sample_count()
        );
    }
}

#[test]
fn test_walk_then_drive_is_inferred() {
    // 12 samples one minute apart: 6 at 1.5 m/s, then 6 at 15 m/s.
    let journey = JourneyBuilder::new()
        .exact(60)
        .leg_with(ModeProfile::new(CanonicalMode::Walking, 1.5, 0.0, 0.0), 6)
        .leg_with(ModeProfile::new(CanonicalMode::Driving, 15.0, 0.0, 0.0), 6)
        .build();
    let samples = journey.samples();
    assert_eq!(samples.len(), 12);

    let segments = ModeDetector::default().detect(&samples);

    let detected: Vec<CanonicalMode> = segments.iter().map(|s| s.mode).collect();
    assert_eq!(detected, vec![CanonicalMode::Walking, CanonicalMode::Driving]);
    assert!(segments.iter().all(|s| s.source == SegmentSource::Inferred));
    assert_eq!((segments[0].start_index, segments[0].end_index), (0, 5));
    assert_eq!((segments[1].start_index, segments[1].end_index), (6, 11));
    assert!(segments_are_contiguous(&segments, samples.len()));
}

#[test]
fn test_provider_annotations_take_priority() {
    // Annotated as cycling, but moving at 72 km/h.
    let journey = JourneyBuilder::new()
        .exact(20)
        .annotated(AnnotationStyle::Overland)
        .leg_with(ModeProfile::CYCLING.with_speed(20.0), 10)
        .build();

    let segments = ModeDetector::default().detect(&journey.samples());

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].mode, CanonicalMode::Cycling);
    assert_eq!(segments[0].source, SegmentSource::Provider("overland"));
    assert_eq!((segments[0].start_index, segments[0].end_index), (0, 9));
}

#[test]
fn test_unknown_gap_merges_with_confidence_downgrade() {
    let journey = JourneyBuilder::new()
        .exact(20)
        .annotated(AnnotationStyle::OwnTracks)
        .leg(CanonicalMode::Driving, 2)
        .unannotated_leg(CanonicalMode::Driving, 1)
        .leg(CanonicalMode::Driving, 2)
        .build();

    let segments = ModeDetector::default().detect(&journey.samples());

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].mode, CanonicalMode::Driving);
    assert_eq!((segments[0].start_index, segments[0].end_index), (0, 4));
    assert_eq!(segments[0].confidence, Confidence::Medium);
    assert_eq!(segments[0].source, SegmentSource::Provider("owntracks"));
}

#[test]
fn test_short_track_gets_default_segment() {
    let journey = JourneyBuilder::new()
        .exact(10)
        .leg(CanonicalMode::Walking, 2)
        .build();

    let run = processor().process(user(), &journey.samples(), false);

    assert_eq!(run.tracks.len(), 1);
    let segments = &run.tracks[0].segments;
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].mode, CanonicalMode::Unknown);
    assert_eq!(segments[0].confidence, Confidence::Low);
    assert_eq!(segments[0].source, SegmentSource::Default);
    assert_eq!((segments[0].start_index, segments[0].end_index), (0, 1));
}

#[test]
fn test_annotated_commute() {
    for (style, label) in [
        (AnnotationStyle::Overland, "overland"),
        (AnnotationStyle::Google, "google"),
        (AnnotationStyle::OwnTracks, "owntracks"),
    ] {
        let journey = JourneyBuilder::commute().annotated(style).with_seed(11).build();
        let run = processor().process(user(), &journey.samples(), true);

        assert_eq!(run.tracks.len(), 1, "{label}");
        assert_eq!(modes(&run, 0), journey.leg_modes(), "{label}");
        assert!(
            run.tracks[0]
                .segments
                .iter()
                .all(|s| s.source == SegmentSource::Provider(label))
        );
        assert_eq!(
            run.tracks[0].breakdown.dominant_mode(),
            Some(CanonicalMode::Driving)
        );
        assert_contiguous(&run);
    }
}

#[test]
fn test_google_rail_trip() {
    let journey = JourneyBuilder::rail_trip()
        .annotated(AnnotationStyle::Google)
        .build();
    let run = processor().process(user(), &journey.samples(), false);

    assert_eq!(run.tracks.len(), 1);
    assert_eq!(
        modes(&run, 0),
        vec![CanonicalMode::Walking, CanonicalMode::Train, CanonicalMode::Walking]
    );
    let train = run.tracks[0].breakdown.get(CanonicalMode::Train);
    assert_eq!(train.segments, 1);
    assert!(train.distance_m > 30_000.0);
}

#[test]
fn test_unannotated_commute_is_mostly_driving() {
    let journey = JourneyBuilder::commute().with_seed(5).build();
    let run = processor().process(user(), &journey.samples(), false);

    assert_eq!(run.tracks.len(), 1);
    let track = &run.tracks[0];
    assert!(track.segments.iter().all(|s| s.source == SegmentSource::Inferred));
    assert_eq!(track.breakdown.dominant_mode(), Some(CanonicalMode::Driving));
    assert_contiguous(&run);
}

#[test]
fn test_segments_always_cover_tracks() {
    let styles = [
        AnnotationStyle::None,
        AnnotationStyle::Overland,
        AnnotationStyle::Google,
        AnnotationStyle::OwnTracks,
    ];
    let processor = processor();
    for seed in 0..4 {
        for style in styles {
            for builder in [
                JourneyBuilder::commute(),
                JourneyBuilder::rail_trip(),
                JourneyBuilder::day_out(),
            ] {
                let journey = builder.with_seed(seed).annotated(style).build();
                let run = processor.process(user(), &journey.samples(), false);
                assert!(!run.tracks.is_empty());
                assert_contiguous(&run);
            }
        }
    }
}

#[test]
fn test_processing_is_idempotent() {
    let processor = processor();
    for style in [AnnotationStyle::None, AnnotationStyle::Google] {
        let samples = JourneyBuilder::day_out()
            .annotated(style)
            .with_seed(9)
            .build()
            .samples();
        let first = processor.process(user(), &samples, true);
        let second = processor.process(user(), &samples, true);
        assert_eq!(first, second);
    }
}

#[test]
fn test_long_pause_splits_tracks() {
    let journey = JourneyBuilder::day_out().with_seed(2).build();
    let run = processor().process(user(), &journey.samples(), true);

    assert!(run.tracks.len() >= 2);
    let last = run.tracks.last().unwrap();
    assert_eq!(last.track.last_sample, journey.records.len() - 1);
    let replace = run.replace.unwrap();
    assert_eq!(replace.start, journey.records[0].timestamp);
    assert_eq!(replace.end, journey.records.last().unwrap().timestamp);
}

#[test]
fn test_incremental_run_covers_recent_window() {
    let samples = JourneyBuilder::rail_trip().build().samples();
    let anchor = samples.last().unwrap().timestamp;
    let processor = processor();

    let now = OffsetDateTime::from_unix_timestamp(anchor + 5).unwrap();
    let run = processor
        .process_incremental(user(), &samples, anchor, now, true)
        .unwrap();
    assert_eq!(run.tracks.len(), 1);
    assert_eq!(run.tracks[0].track.first_sample, 0);

    let later = OffsetDateTime::from_unix_timestamp(anchor + 2 * 3600).unwrap();
    assert!(
        processor
            .process_incremental(user(), &samples, anchor, later, true)
            .is_none()
    );
}

#[test]
fn test_batch_keeps_user_order() {
    let batches: Vec<UserBatch> = (0..6u64)
        .map(|i| UserBatch {
            user_id: Uuid::from_u128(i as u128),
            samples: JourneyBuilder::commute().with_seed(i).build().samples(),
        })
        .collect();

    let runs = processor().process_batch(batches, false);

    let ids: Vec<u128> = runs.iter().map(|r| r.user_id.as_u128()).collect();
    assert_eq!(ids, (0..6).collect::<Vec<u128>>());
    assert!(runs.iter().all(|r| r.tracks.len() == 1));
}

#[test]
fn test_gpx_fixture_through_pipeline() {
    let journey = JourneyBuilder::new()
        .exact(60)
        .leg_with(ModeProfile::WALKING.steady(), 10)
        .build();
    let bytes = generate_gpx(&journey.samples(), "walk").unwrap();
    let samples = GpxLoader::load_bytes(&bytes).unwrap();
    assert!(samples.iter().all(|s| s.velocity.is_none()));

    let run = processor().process(user(), &samples, false);

    assert_eq!(run.tracks.len(), 1);
    assert_eq!(
        run.tracks[0].breakdown.dominant_mode(),
        Some(CanonicalMode::Walking)
    );
    assert_contiguous(&run);
}
