//! Prints a generated journey as JSON sample records.
//!
//! Run with:
//! ```
//! cargo run -p test-data --bin generate -- commute > commute.json
//! cargo run -p tracks -- commute.json
//! ```
//!
//! `TEST_DATA_SEED` fixes the random seed, `TEST_DATA_ANNOTATION` picks the
//! provider style (`none`, `overland`, `google`, `own_tracks`) and
//! `TEST_DATA_GPX` additionally writes the samples to a GPX file.

use anyhow::{Context, bail};
use test_data::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let scenario = std::env::args().nth(1).unwrap_or_else(|| "commute".to_string());
    let builder = match scenario.as_str() {
        "commute" => JourneyBuilder::commute(),
        "rail" => JourneyBuilder::rail_trip(),
        "day-out" => JourneyBuilder::day_out(),
        other => bail!("unknown scenario {other:?}, expected commute, rail or day-out"),
    };

    let seed = match std::env::var("TEST_DATA_SEED") {
        Ok(seed) => seed.parse().context("TEST_DATA_SEED must be an integer")?,
        Err(_) => rand::random(),
    };
    let style: AnnotationStyle = match std::env::var("TEST_DATA_ANNOTATION") {
        Ok(style) => serde_json::from_value(serde_json::Value::String(style))
            .context("TEST_DATA_ANNOTATION must be none, overland, google or own_tracks")?,
        Err(_) => AnnotationStyle::None,
    };

    let journey = builder.with_seed(seed).annotated(style).build();

    tracing::info!("Generated {} scenario", scenario);
    tracing::info!("  Seed: {}", seed);
    tracing::info!("  Records: {}", journey.records.len());
    for leg in &journey.legs {
        tracing::info!("  {}: records {:?}", leg.mode, leg.records);
    }

    if let Ok(path) = std::env::var("TEST_DATA_GPX") {
        GpxLoader::write_file(&path, &journey.samples(), Some(&scenario))?;
        tracing::info!("Wrote GPX to {}", path);
    }

    println!("{}", journey.to_json()?);
    Ok(())
}
