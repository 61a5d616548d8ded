use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use scanlens_config::Config;
use scanlens_replay::{Recording, ReplayDecoder, ReplayMedia};
use tracing_subscriber::EnvFilter;

pub mod controller;
pub mod events;
pub mod orchestrator;
pub mod profile;
pub mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;

/// Live code scanner over a recorded camera backend
#[derive(Parser, Debug)]
#[command(name = "scanlens", version)]
struct Args {
    /// JSON config file, defaults to ./scanlens.json when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera recording to play back
    #[arg(long)]
    recording: Option<PathBuf>,

    /// Display size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_display)]
    display: Option<(f64, f64)>,
}

fn parse_display(value: &str) -> Result<(f64, f64), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let w: f64 = w.parse().map_err(|_| format!("invalid width '{w}'"))?;
    let h: f64 = h.parse().map_err(|_| format!("invalid height '{h}'"))?;
    Ok((w, h))
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(atty::is(atty::Stream::Stdout));

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = profile::load_config(args.config.as_deref())?;
    if let Some(path) = args.recording {
        config.replay.recording_path = path;
    }
    if let Some((width, height)) = args.display {
        config.overlay.display_width = width;
        config.overlay.display_height = height;
    }

    init_tracing(&config);

    let runtime = tokio::runtime::Runtime::new().context("Failed to build tokio runtime")?;
    let result = runtime.block_on(run(config));
    // A pending stdin read can't be cancelled, don't wait on it
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    let recording = Arc::new(Recording::load(&config.replay.recording_path)?);
    let media = Arc::new(ReplayMedia::new(
        recording.clone(),
        Duration::from_millis(config.replay.frame_interval_ms),
    ));
    let decoder = Arc::new(ReplayDecoder::new(recording));

    let controller = AppController::new(config);
    let (handle, mut tasks) = controller.spawn_tasks(media, decoder);

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
            tracing::info!("Shutdown requested");
        }
        _ = controller.cancelled() => {
            tracing::info!("Quit requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("task exited"),
                Ok(Err(e)) => tracing::error!("task failed: {e}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    controller.shutdown(&handle).await;

    let drain = async {
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(Err(e)) => tracing::error!("task failed during shutdown: {e}"),
                Err(e) if e.is_panic() => tracing::error!("task panicked: {e}"),
                _ => {}
            }
        }
    };
    if tokio::time::timeout(Duration::from_secs(2), drain).await.is_err() {
        tracing::warn!("Timed out waiting for tasks, aborting");
        tasks.abort_all();
    }

    Ok(())
}
