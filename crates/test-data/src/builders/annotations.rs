//! Raw provider payloads in the shapes the importers hand over.

use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracks::CanonicalMode;

use crate::config::AnnotationStyle;

/// Raw motion payload a provider would attach to a sample in `mode`.
///
/// `None` when the provider has no word for the mode.
pub fn motion_payload(
    style: AnnotationStyle,
    mode: CanonicalMode,
    timestamp: i64,
) -> Option<Value> {
    match style {
        AnnotationStyle::None => None,
        AnnotationStyle::Overland => overland_payload(mode),
        AnnotationStyle::Google => google_payload(mode, timestamp),
        AnnotationStyle::OwnTracks => owntracks_payload(mode),
    }
}

fn overland_payload(mode: CanonicalMode) -> Option<Value> {
    let motion = match mode {
        CanonicalMode::Stationary => "stationary",
        CanonicalMode::Walking => "walking",
        CanonicalMode::Running => "running",
        CanonicalMode::Cycling => "cycling",
        CanonicalMode::Driving => "driving",
        CanonicalMode::Flying => {
            return Some(json!({ "motion": [], "activity": "airborne" }));
        }
        _ => return None,
    };
    Some(json!({ "motion": [motion], "activity": "other_navigation" }))
}

fn google_payload(mode: CanonicalMode, timestamp: i64) -> Option<Value> {
    let kind = match mode {
        CanonicalMode::Stationary => "STILL",
        CanonicalMode::Walking => "WALKING",
        CanonicalMode::Running => "RUNNING",
        CanonicalMode::Cycling => "ON_BICYCLE",
        CanonicalMode::Driving => "IN_PASSENGER_VEHICLE",
        CanonicalMode::Motorcycle => "MOTORCYCLING",
        CanonicalMode::Bus => "IN_BUS",
        CanonicalMode::Train => "IN_TRAIN",
        CanonicalMode::Boat => "IN_FERRY",
        CanonicalMode::Flying => "FLYING",
        CanonicalMode::Unknown => return None,
    };
    let timestamp = OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|ts| ts.format(&Rfc3339).ok());

    // Records.json lists several candidates; TILTING carries no mode.
    Some(json!({
        "activity": [{
            "timestamp": timestamp,
            "activity": [
                { "type": "TILTING", "confidence": 90 },
                { "type": kind, "confidence": 75 },
                { "type": "UNKNOWN", "confidence": 10 }
            ]
        }]
    }))
}

fn owntracks_payload(mode: CanonicalMode) -> Option<Value> {
    let state = match mode {
        CanonicalMode::Stationary => 0,
        CanonicalMode::Walking => 1,
        CanonicalMode::Running => 2,
        CanonicalMode::Cycling => 3,
        CanonicalMode::Driving => 4,
        _ => return None,
    };
    Some(json!({ "motion_state": state }))
}
