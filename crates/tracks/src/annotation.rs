//! Provider motion annotations.
//!
//! Raw provider payloads are loosely keyed JSON. They are normalized once, at the
//! ingestion boundary, into [`ProviderAnnotation`]; nothing past this module looks
//! at raw key-value maps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    models::CanonicalMode,
    vocabulary::{self, GOOGLE, OVERLAND, OWNTRACKS},
};

/// One entry of a Google probable-activity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCandidate {
    pub kind: String,
    pub confidence: Option<f64>,
}

/// Provider-supplied motion annotation in normalized form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ProviderAnnotation {
    /// Overland: motion list plus an activity/action fallback.
    Overland {
        motion: Vec<String>,
        activity: Option<String>,
    },
    /// Google location history, live or phone export.
    GoogleActivity { candidates: Vec<ActivityCandidate> },
    /// OwnTracks numeric motion state.
    OwnTracks { motion_state: i64 },
    #[default]
    None,
}

impl ProviderAnnotation {
    /// Normalizes a raw provider payload.
    ///
    /// Vocabularies are tried in order Overland, Google, OwnTracks. The first one
    /// that maps to a known mode wins. A recognized payload that only maps to
    /// `unknown` is kept (first recognized) so provenance is not lost.
    pub fn from_payload(payload: &Value) -> Self {
        let parsers: [fn(&Value) -> Option<Self>; 3] =
            [Self::parse_overland, Self::parse_google, Self::parse_owntracks];

        let mut first_recognized = None;
        for parse in parsers {
            let Some(annotation) = parse(payload) else {
                continue;
            };
            if annotation.mode().0.is_known() {
                return annotation;
            }
            first_recognized.get_or_insert(annotation);
        }
        first_recognized.unwrap_or_default()
    }

    /// Prefers an already-normalized payload over the original provider payload.
    pub fn resolve(normalized: Option<&Value>, raw: Option<&Value>) -> Self {
        if let Some(normalized) = normalized {
            let annotation = Self::from_payload(normalized);
            if annotation.mode().0.is_known() {
                return annotation;
            }
        }
        raw.map(Self::from_payload).unwrap_or_default()
    }

    /// Canonical mode and provider label for this annotation.
    pub fn mode(&self) -> (CanonicalMode, Option<&'static str>) {
        match self {
            ProviderAnnotation::Overland { motion, activity } => {
                (overland_motion_mode(motion, activity.as_deref()), Some(OVERLAND))
            }
            ProviderAnnotation::GoogleActivity { candidates } => {
                (google_candidate_mode(candidates), Some(GOOGLE))
            }
            ProviderAnnotation::OwnTracks { motion_state } => {
                (vocabulary::owntracks_mode(*motion_state), Some(OWNTRACKS))
            }
            ProviderAnnotation::None => (CanonicalMode::Unknown, None),
        }
    }

    fn parse_overland(payload: &Value) -> Option<Self> {
        let body = payload.get("properties").unwrap_or(payload);
        let motion = match body.get("motion")? {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            Value::String(single) => vec![single.clone()],
            _ => return None,
        };
        let activity = body
            .get("activity")
            .and_then(Value::as_str)
            .or_else(|| body.get("action").and_then(Value::as_str))
            .map(str::to_owned);

        Some(ProviderAnnotation::Overland { motion, activity })
    }

    fn parse_google(payload: &Value) -> Option<Self> {
        let mut candidates = Vec::new();

        // Semantic history: direct activity type.
        if let Some(kind) = payload.get("activityType").and_then(Value::as_str) {
            candidates.push(ActivityCandidate {
                kind: kind.to_owned(),
                confidence: None,
            });
        }

        match payload.get("activity") {
            // Records.json: [{ timestamp, activity: [{ type, confidence }] }]
            Some(Value::Array(entries)) => {
                if let Some(list) = entries
                    .first()
                    .and_then(|entry| entry.get("activity"))
                    .and_then(Value::as_array)
                {
                    candidates.extend(list.iter().filter_map(parse_candidate));
                }
            }
            // Phone export: { topCandidate: { type, probability } }
            Some(activity @ Value::Object(_)) => {
                if let Some(top) = activity.get("topCandidate").and_then(parse_candidate) {
                    candidates.push(top);
                }
            }
            _ => {}
        }

        if let Some(list) = payload
            .get("activityRecord")
            .and_then(|r| r.get("probableActivities"))
            .and_then(Value::as_array)
        {
            candidates.extend(list.iter().filter_map(parse_candidate));
        }

        if candidates.is_empty() {
            None
        } else {
            Some(ProviderAnnotation::GoogleActivity { candidates })
        }
    }

    fn parse_owntracks(payload: &Value) -> Option<Self> {
        let state = payload
            .get("motion_state")
            .or_else(|| payload.get("motionState"))?;
        let motion_state = state
            .as_i64()
            .or_else(|| state.as_str().and_then(|s| s.trim().parse().ok()))?;
        Some(ProviderAnnotation::OwnTracks { motion_state })
    }
}

fn parse_candidate(value: &Value) -> Option<ActivityCandidate> {
    let kind = value.get("type").and_then(Value::as_str)?;
    let confidence = value
        .get("confidence")
        .or_else(|| value.get("probability"))
        .and_then(|c| {
            c.as_f64()
                .or_else(|| c.as_str().and_then(|s| s.trim().parse().ok()))
        });
    Some(ActivityCandidate {
        kind: kind.to_owned(),
        confidence,
    })
}

/// First non-stationary known entry wins; all-stationary lists are stationary.
fn overland_motion_mode(motion: &[String], activity: Option<&str>) -> CanonicalMode {
    let mut saw_stationary = false;
    for mode in motion.iter().map(|m| vocabulary::overland_mode(m)) {
        match mode {
            CanonicalMode::Stationary => saw_stationary = true,
            CanonicalMode::Unknown => {}
            known => return known,
        }
    }
    if saw_stationary {
        return CanonicalMode::Stationary;
    }
    activity
        .map(vocabulary::overland_mode)
        .unwrap_or(CanonicalMode::Unknown)
}

/// Highest-confidence candidate that maps to a known mode; ties keep list order.
fn google_candidate_mode(candidates: &[ActivityCandidate]) -> CanonicalMode {
    let mut best: Option<(CanonicalMode, f64)> = None;
    for candidate in candidates {
        let mode = vocabulary::google_mode(&candidate.kind);
        if !mode.is_known() {
            continue;
        }
        let confidence = candidate.confidence.unwrap_or(0.0);
        if best.is_none_or(|(_, c)| confidence > c) {
            best = Some((mode, confidence));
        }
    }
    best.map_or(CanonicalMode::Unknown, |(mode, _)| mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overland_prefers_first_non_stationary() {
        let annotation =
            ProviderAnnotation::from_payload(&json!({ "motion": ["stationary", "driving"] }));
        assert_eq!(annotation.mode(), (CanonicalMode::Driving, Some(OVERLAND)));
    }

    #[test]
    fn test_overland_all_stationary() {
        let annotation =
            ProviderAnnotation::from_payload(&json!({ "motion": ["stationary", "stationary"] }));
        assert_eq!(annotation.mode().0, CanonicalMode::Stationary);
    }

    #[test]
    fn test_overland_activity_fallback_in_properties() {
        let annotation = ProviderAnnotation::from_payload(&json!({
            "properties": { "motion": [], "activity": "automotive_navigation" }
        }));
        assert_eq!(annotation.mode(), (CanonicalMode::Driving, Some(OVERLAND)));
    }

    #[test]
    fn test_google_records_highest_confidence() {
        let annotation = ProviderAnnotation::from_payload(&json!({
            "activity": [{
                "timestamp": "2024-01-01T00:00:00Z",
                "activity": [
                    { "type": "UNKNOWN", "confidence": 90 },
                    { "type": "ON_FOOT", "confidence": 40 },
                    { "type": "IN_VEHICLE", "confidence": 55 }
                ]
            }]
        }));
        assert_eq!(annotation.mode(), (CanonicalMode::Driving, Some(GOOGLE)));
    }

    #[test]
    fn test_google_phone_export() {
        let annotation = ProviderAnnotation::from_payload(&json!({
            "activity": { "topCandidate": { "type": "in subway", "probability": "0.8" } }
        }));
        assert_eq!(annotation.mode(), (CanonicalMode::Train, Some(GOOGLE)));
    }

    #[test]
    fn test_google_semantic_activity_type() {
        let annotation = ProviderAnnotation::from_payload(&json!({ "activityType": "IN_FERRY" }));
        assert_eq!(annotation.mode().0, CanonicalMode::Boat);
    }

    #[test]
    fn test_owntracks_motion_state() {
        let annotation = ProviderAnnotation::from_payload(&json!({ "motion_state": 3 }));
        assert_eq!(annotation.mode(), (CanonicalMode::Cycling, Some(OWNTRACKS)));
    }

    #[test]
    fn test_later_vocabulary_wins_when_earlier_is_unknown() {
        let annotation = ProviderAnnotation::from_payload(&json!({
            "motion": ["unknown"],
            "activityType": "WALKING"
        }));
        assert_eq!(annotation.mode(), (CanonicalMode::Walking, Some(GOOGLE)));
    }

    #[test]
    fn test_recognized_but_unknown_keeps_provider() {
        let annotation = ProviderAnnotation::from_payload(&json!({ "motion": ["unknown"] }));
        assert!(matches!(annotation, ProviderAnnotation::Overland { .. }));
        assert_eq!(annotation.mode().0, CanonicalMode::Unknown);
    }

    #[test]
    fn test_unrecognized_payload_is_none() {
        let annotation = ProviderAnnotation::from_payload(&json!({ "battery": 80 }));
        assert_eq!(annotation, ProviderAnnotation::None);
        assert_eq!(annotation.mode(), (CanonicalMode::Unknown, None));
    }

    #[test]
    fn test_resolve_prefers_normalized() {
        let normalized = json!({ "motion": ["cycling"] });
        let raw = json!({ "activityType": "IN_BUS" });
        let annotation = ProviderAnnotation::resolve(Some(&normalized), Some(&raw));
        assert_eq!(annotation.mode().0, CanonicalMode::Cycling);

        let annotation = ProviderAnnotation::resolve(None, Some(&raw));
        assert_eq!(annotation.mode().0, CanonicalMode::Bus);
    }
}
