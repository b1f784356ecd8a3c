//! campus-motion - motion core replay tool
//!
//! Mounts the motion engine against a recorded trace and prints the
//! resulting engine summary as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_motion::config::MotionConfig;
use campus_motion::render::{NullSink, RecordingSink};
use campus_motion::replay::{replay_offline, replay_realtime, ReplayTrace, DEFAULT_FRAME_MS};

/// Command-line arguments for campus-motion
#[derive(Parser, Debug)]
#[command(name = "campus-motion")]
#[command(version, about = "Replay input traces through the motion core", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults apply when omitted)
    #[arg(short, long, env = "CAMPUS_MOTION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Input trace (JSON)
    #[arg(short, long)]
    pub trace: PathBuf,

    /// Drive frames on the wall clock instead of fixed offline steps
    #[arg(long)]
    pub realtime: bool,

    /// Frame delta for offline replay (ms)
    #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
    pub frame_ms: f32,

    /// Force the reduced quality tier
    #[arg(long)]
    pub reduced_motion: bool,

    /// Particle RNG seed
    #[arg(long, env = "CAMPUS_MOTION_SEED")]
    pub seed: Option<u64>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "compact")]
    pub log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!("campus-motion v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args).await {
        eprintln!("{}", campus_motion::utils::format_user_error(&e));
        return Err(e);
    }
    Ok(())
}

async fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => MotionConfig::load(path)?,
        None => {
            info!("No configuration file given, using defaults");
            MotionConfig::default()
        }
    };
    let config = config.with_overrides(args.reduced_motion, args.seed);
    tracing::debug!("Config: {:?}", config);

    let trace = ReplayTrace::load(&args.trace)?;

    let report = if args.realtime {
        replay_realtime(config, &trace, NullSink).await?
    } else {
        let mut sink = RecordingSink::new();
        let report = replay_offline(config, &trace, &mut sink, args.frame_ms)?;
        info!(
            "Sink: {} writes, {} rejected, {} releases",
            sink.writes(),
            sink.rejected(),
            sink.releases()
        );
        report
    };

    info!(
        "Replay finished: {} frames, {} events delivered, tier {}",
        report.summary.frames, report.events_delivered, report.summary.tier
    );

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize summary")?;
    println!("{}", json);
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    use std::fs::File;
    use std::sync::Mutex;
    use tracing_subscriber::{fmt, Layer};

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("campus_motion={},warn", log_level))
    });

    // stdout carries the JSON report, so every log layer writes elsewhere
    let stderr_layer = match args.log_format.as_str() {
        "json" => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        "pretty" => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        _ => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    let file_layer = match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let writer = Mutex::new(file);
            let layer = if args.log_format == "json" {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed()
            } else {
                fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed()
            };
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(path) = &args.log_file {
        info!("Logging to file: {}", path.display());
    }
    Ok(())
}
