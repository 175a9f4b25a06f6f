//! Provider activity vocabularies mapped onto [`CanonicalMode`].

use crate::models::CanonicalMode;

pub const OVERLAND: &str = "overland";
pub const GOOGLE: &str = "google";
pub const OWNTRACKS: &str = "owntracks";

/// Overland `motion` entries and `activity`/`action` fallbacks.
pub fn overland_mode(value: &str) -> CanonicalMode {
    match value.trim().to_ascii_lowercase().as_str() {
        "stationary" | "still" => CanonicalMode::Stationary,
        "walking" | "fitness" => CanonicalMode::Walking,
        "running" => CanonicalMode::Running,
        "cycling" => CanonicalMode::Cycling,
        "driving" | "automotive" | "automotive_navigation" => CanonicalMode::Driving,
        "airborne" => CanonicalMode::Flying,
        _ => CanonicalMode::Unknown,
    }
}

/// Google activity types, both the Records.json `SCREAMING_CASE` flavor and the
/// on-device export flavor (`"in passenger vehicle"`).
pub fn google_mode(value: &str) -> CanonicalMode {
    let normalized = value.trim().to_ascii_uppercase().replace([' ', '-'], "_");
    match normalized.as_str() {
        "STILL" | "STATIONARY" => CanonicalMode::Stationary,
        "WALKING" | "ON_FOOT" | "HIKING" => CanonicalMode::Walking,
        "RUNNING" => CanonicalMode::Running,
        "ON_BICYCLE" | "CYCLING" | "IN_BICYCLE" => CanonicalMode::Cycling,
        "IN_VEHICLE" | "IN_ROAD_VEHICLE" | "IN_PASSENGER_VEHICLE" | "IN_CAR" | "DRIVING"
        | "IN_TAXI" => CanonicalMode::Driving,
        "MOTORCYCLING" => CanonicalMode::Motorcycle,
        "IN_BUS" => CanonicalMode::Bus,
        "IN_RAIL_VEHICLE" | "IN_TRAIN" | "IN_SUBWAY" | "IN_TRAM" => CanonicalMode::Train,
        "FLYING" => CanonicalMode::Flying,
        "IN_FERRY" | "SAILING" | "BOATING" | "IN_BOAT" => CanonicalMode::Boat,
        _ => CanonicalMode::Unknown,
    }
}

/// OwnTracks numeric motion state.
pub fn owntracks_mode(state: i64) -> CanonicalMode {
    match state {
        0 => CanonicalMode::Stationary,
        1 => CanonicalMode::Walking,
        2 => CanonicalMode::Running,
        3 => CanonicalMode::Cycling,
        4 => CanonicalMode::Driving,
        _ => CanonicalMode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_export_flavors() {
        assert_eq!(google_mode("IN_PASSENGER_VEHICLE"), CanonicalMode::Driving);
        assert_eq!(google_mode("in passenger vehicle"), CanonicalMode::Driving);
        assert_eq!(google_mode("in subway"), CanonicalMode::Train);
        assert_eq!(google_mode("IN_TRAM"), CanonicalMode::Train);
        assert_eq!(google_mode("IN_FERRY"), CanonicalMode::Boat);
        assert_eq!(google_mode("sailing"), CanonicalMode::Boat);
        assert_eq!(google_mode("TILTING"), CanonicalMode::Unknown);
    }

    #[test]
    fn test_overland_vocabulary() {
        assert_eq!(overland_mode("automotive_navigation"), CanonicalMode::Driving);
        assert_eq!(overland_mode("Walking"), CanonicalMode::Walking);
        assert_eq!(overland_mode("other_navigation"), CanonicalMode::Unknown);
    }

    #[test]
    fn test_owntracks_states() {
        assert_eq!(owntracks_mode(0), CanonicalMode::Stationary);
        assert_eq!(owntracks_mode(4), CanonicalMode::Driving);
        assert_eq!(owntracks_mode(9), CanonicalMode::Unknown);
    }
}
