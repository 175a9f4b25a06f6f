//! GPX file loading and writing.

use std::path::Path;

use gpx::{Gpx, read};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;
use tracks::Sample;

use crate::gpx::build_gpx;

#[derive(Debug, Error)]
pub enum GpxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GPX parse error: {0}")]
    Parse(#[from] gpx::errors::GpxError),
    #[error("No tracks found in GPX file")]
    NoTracks,
    #[error("No timestamped points found")]
    NoSamples,
    #[error("Timestamp out of range: {0}")]
    Timestamp(#[from] time::error::ComponentRange),
}

/// Loads and writes location samples as GPX tracks.
pub struct GpxLoader;

impl GpxLoader {
    /// Loads samples from a GPX file.
    ///
    /// All tracks and segments are flattened into one list ordered as in the
    /// file. Points without a timestamp are skipped.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Sample>, GpxError> {
        let file = std::fs::File::open(path)?;
        let gpx: Gpx = read(std::io::BufReader::new(file))?;
        Self::extract_samples(&gpx)
    }

    pub fn load_bytes(data: &[u8]) -> Result<Vec<Sample>, GpxError> {
        let gpx: Gpx = read(std::io::Cursor::new(data))?;
        Self::extract_samples(&gpx)
    }

    fn extract_samples(gpx: &Gpx) -> Result<Vec<Sample>, GpxError> {
        if gpx.tracks.is_empty() {
            return Err(GpxError::NoTracks);
        }

        let mut samples = Vec::new();
        let mut untimed = 0usize;

        for waypoint in gpx.tracks.iter().flat_map(|t| &t.segments).flat_map(|s| &s.points) {
            let Some(time) = waypoint.time else {
                untimed += 1;
                continue;
            };
            let point = waypoint.point();
            let timestamp = OffsetDateTime::from(time).unix_timestamp();
            let mut sample = Sample::new(timestamp, point.y(), point.x());
            sample.altitude = waypoint.elevation;
            sample.velocity = waypoint.speed;
            samples.push(sample);
        }

        if untimed > 0 {
            warn!(untimed, "skipped GPX points without a timestamp");
        }
        if samples.is_empty() {
            return Err(GpxError::NoSamples);
        }

        Ok(samples)
    }

    /// Writes samples as a single-segment GPX 1.1 track.
    pub fn write_file(
        path: impl AsRef<Path>,
        samples: &[Sample],
        name: Option<&str>,
    ) -> Result<(), GpxError> {
        let gpx = build_gpx(samples, name)?;
        let file = std::fs::File::create(path)?;
        gpx::write(&gpx, file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_load() {
        let samples = vec![
            Sample::new(1_700_000_000, 48.137, 11.575).with_altitude(520.0),
            Sample::new(1_700_000_060, 48.138, 11.576).with_altitude(522.5),
        ];

        let temp_path = std::env::temp_dir().join("tracks_test_write_then_load.gpx");
        GpxLoader::write_file(&temp_path, &samples, Some("Test Track")).unwrap();

        let loaded = GpxLoader::load_file(&temp_path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].timestamp, 1_700_000_060);
        assert_eq!(loaded[0].altitude, Some(520.0));

        std::fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_empty_gpx_has_no_tracks() {
        let gpx = br#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1"></gpx>"#;
        assert!(matches!(GpxLoader::load_bytes(gpx), Err(GpxError::NoTracks)));
    }
}
