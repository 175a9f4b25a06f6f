//! Sample records as handed over by the importers.

use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{annotation::ProviderAnnotation, errors::IngestError, models::Sample};

/// Wire shape of one location sample before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub timestamp: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub velocity: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Original provider payload.
    #[serde(default)]
    pub motion_data: Option<Value>,
    /// Payload already normalized by an importer; preferred over `motion_data`.
    #[serde(default)]
    pub normalized_motion: Option<Value>,
}

impl From<SampleRecord> for Sample {
    fn from(record: SampleRecord) -> Self {
        let annotation = ProviderAnnotation::resolve(
            record.normalized_motion.as_ref(),
            record.motion_data.as_ref(),
        );
        Sample {
            timestamp: record.timestamp,
            coordinates: crate::models::Coordinates::new(record.lat, record.lon),
            velocity: record.velocity,
            altitude: record.altitude,
            annotation,
        }
    }
}

/// Normalizes records into samples ordered by timestamp.
pub fn into_samples(records: Vec<SampleRecord>) -> Vec<Sample> {
    let mut samples: Vec<Sample> = records.into_iter().map(Sample::from).collect();
    if !samples.is_sorted_by_key(|s| s.timestamp) {
        debug!(samples = samples.len(), "input out of order, sorting by timestamp");
        samples.sort_by_key(|s| s.timestamp);
    }
    samples
}

/// Parses a JSON array of [`SampleRecord`]s.
pub fn read_samples(reader: impl Read) -> Result<Vec<Sample>, IngestError> {
    let records: Vec<SampleRecord> = serde_json::from_reader(reader)?;
    if records.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(into_samples(records))
}
