use clap::Parser;
use match_sim::{Settings, SimulationEngine};
use std::path::PathBuf;
use tracing::{error, info};

/// Run one residency-match simulation and emit a JSON report.
#[derive(Debug, Parser)]
#[command(name = "match-sim", version, about)]
struct Args {
    /// Path to a TOML configuration file (defaults to config/default.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting match-sim simulation run...");

    // Load configuration
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    if let Some(seed) = args.seed {
        settings.run.seed = seed;
    }

    info!(seed = settings.run.seed, "Configuration loaded successfully");

    let engine = SimulationEngine::new(settings);
    let report = engine.run().unwrap_or_else(|e| {
        error!("Simulation failed: {}", e);
        std::process::exit(1);
    });

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", json),
    }

    Ok(())
}
