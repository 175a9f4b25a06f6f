//! GPX document generation from samples.
//!
//! Produces GPX 1.1 in memory, for fixtures fed to [`GpxLoader::load_bytes`]
//! or handed to importers.
//!
//! [`GpxLoader::load_bytes`]: crate::sources::GpxLoader::load_bytes

use gpx::{Gpx, GpxVersion, Metadata, Track, TrackSegment, Waypoint};
use time::OffsetDateTime;
use tracks::Sample;

use crate::sources::GpxError;

/// Builds a GPX 1.1 document with a single track and segment.
///
/// Each point carries lat/lon, altitude when known, and its timestamp.
pub fn build_gpx(samples: &[Sample], name: Option<&str>) -> Result<Gpx, GpxError> {
    let points = samples
        .iter()
        .map(|s| {
            let mut wp = Waypoint::new(s.coordinates.point());
            wp.elevation = s.altitude;
            wp.time = Some(gpx::Time::from(OffsetDateTime::from_unix_timestamp(s.timestamp)?));
            Ok(wp)
        })
        .collect::<Result<Vec<_>, GpxError>>()?;

    let mut track = Track::new();
    track.name = name.map(String::from);
    track.segments = vec![TrackSegment { points }];

    Ok(Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("tracks-test-data".to_string()),
        metadata: name.map(|name| Metadata {
            name: Some(name.to_string()),
            ..Default::default()
        }),
        tracks: vec![track],
        ..Default::default()
    })
}

/// Serializes samples as GPX 1.1 bytes.
pub fn generate_gpx(samples: &[Sample], name: &str) -> Result<Vec<u8>, GpxError> {
    let gpx = build_gpx(samples, Some(name))?;
    let mut bytes = Vec::new();
    gpx::write(&gpx, &mut bytes)?;
    Ok(bytes)
}
