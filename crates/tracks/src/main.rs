use std::{env, fs::File, io};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tracks::{PipelineConfig, TrackProcessor, ingest};
use uuid::Uuid;

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config() -> anyhow::Result<PipelineConfig> {
    match env::var("TRACKS_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading config from {}", path);
            Ok(PipelineConfig::from_json(&std::fs::read_to_string(path)?)?)
        }
        Err(_) => Ok(PipelineConfig::from_env()?),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let config = load_config()?;

    let user_id = env::var("TRACKS_USER_ID")
        .ok()
        .and_then(|id| id.parse::<Uuid>().ok())
        .unwrap_or_else(Uuid::new_v4);

    let samples = match env::args().nth(1) {
        Some(path) => ingest::read_samples(File::open(path)?)?,
        None => ingest::read_samples(io::stdin().lock())?,
    };

    let cleanup = env::var("TRACKS_CLEANUP").is_ok_and(|v| v == "1" || v == "true");
    let processor = TrackProcessor::new(&config)?;
    let run = processor.process(user_id, &samples, cleanup);

    tracing::info!(
        "Processed {} samples into {} tracks for user {}",
        samples.len(),
        run.tracks.len(),
        user_id
    );

    serde_json::to_writer_pretty(io::stdout().lock(), &run)?;
    println!();
    Ok(())
}
