// GeoTour - geofenced audio walking tour
// Feed it a recorded route and it plays each stop's narration as you
// "walk" into the zone, exactly like the live tour does with real GPS

mod audio;
mod config;
mod geo;
mod location;
mod tour;
mod tracker;
mod ui;
mod zone;

use anyhow::Result;
use clap::Parser;
use config::{Config, PreloadMode};
use location::{RouteSource, SourceOptions};
use std::path::PathBuf;
use std::time::Duration;
use tour::Tour;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "geotour", about = "Geofenced audio walking tour")]
struct Args {
    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recorded route to replay: a JSON array of {latitude, longitude} fixes
    #[arg(long)]
    route: PathBuf,

    /// Milliseconds between replayed fixes
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Override the configured entry radius, meters
    #[arg(long)]
    radius: Option<f64>,

    /// Override the configured preload mode
    #[arg(long, value_parser = parse_preload)]
    preload: Option<PreloadMode>,

    /// Also write logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn parse_preload(s: &str) -> Result<PreloadMode, String> {
    match s {
        "eager" => Ok(PreloadMode::Eager),
        "lazy" => Ok(PreloadMode::Lazy),
        other => Err(format!("expected 'eager' or 'lazy', got '{other}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Keep the guard alive for the whole run or the file writer shuts down
    let _log_guard = init_logging(args.log_dir.as_deref());

    // Load config - falls back to defaults (the five-stop walk) if missing
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(radius) = args.radius {
        config.tracking.entry_radius_m = radius;
    }
    if let Some(preload) = args.preload {
        config.audio.preload = preload;
    }

    let mut source = RouteSource::from_file(
        &args.route,
        Duration::from_millis(args.interval_ms),
        SourceOptions::from(&config.location),
    )?;

    let mut tour = Tour::new(config)?;
    tour.run(&mut source).await?;

    Ok(())
}

fn init_logging(log_dir: Option<&std::path::Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "geotour.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
