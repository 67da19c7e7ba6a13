//! Headless skyship flight runner.
//!
//! This binary flies vehicles without graphics, either controlled via JSON
//! on stdin/stdout or from RON scenarios.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p skyship_headless
//!
//! # Fly one scenario and print the metrics
//! cargo run -p skyship_headless -- fly --scenario hover_test --seed 3
//!
//! # Fly a scenario over many seeds
//! cargo run -p skyship_headless -- batch --scenario overheat_run --count 200 --output results/
//!
//! # Check that a seed always produces the same flight
//! cargo run -p skyship_headless -- verify --scenario field_overload --seed 12345 --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyship_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    flight_runner::FlightRunner,
    runner::{HeadlessConfig, HeadlessRunner},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "skyship_headless")]
#[command(about = "Headless skyship flight runner for scripted flights and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session
    Run {
        /// Scenario (built-in name or RON file) to load
        #[arg(short, long)]
        scenario: Option<String>,

        /// Only output state on `query`
        #[arg(long)]
        no_auto_state: bool,
    },

    /// Fly one scenario and write its metrics
    Fly {
        /// Scenario (built-in name or RON file)
        #[arg(short, long, default_value = "hover_test")]
        scenario: String,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Metrics JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fly one scenario over a range of seeds
    Batch {
        /// Scenario (built-in name or RON file)
        #[arg(short, long, default_value = "hover_test")]
        scenario: String,

        /// Number of flights
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Verify determinism by flying the same seed multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long, default_value = "field_overload")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            scenario,
            no_auto_state,
        }) => cmd_run(scenario, !no_auto_state),
        Some(Commands::Fly {
            scenario,
            seed,
            output,
        }) => cmd_fly(&scenario, seed, output),
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
        }) => cmd_batch(&scenario, count, parallel, output, seed),
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => cmd_verify(&scenario, seed, runs),
        None => cmd_run(None, true),
    };

    match result {
        Ok(code) => code,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Run an interactive session on stdin/stdout
fn cmd_run(scenario: Option<String>, auto_state: bool) -> Result<ExitCode, String> {
    info!("Starting interactive session");

    let config = HeadlessConfig {
        auto_state_output: auto_state,
        scenario,
        ..Default::default()
    };
    let mut runner = HeadlessRunner::new(config).map_err(|e| e.to_string())?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    runner
        .run(stdin.lock(), stdout.lock())
        .map_err(|e| format!("Session I/O failed: {e}"))?;
    Ok(ExitCode::SUCCESS)
}

/// Fly a single scenario
fn cmd_fly(scenario: &str, seed: u64, output: Option<PathBuf>) -> Result<ExitCode, String> {
    let scenario = Scenario::resolve(scenario).map_err(|e| e.to_string())?;
    let metrics = FlightRunner::new(&scenario)
        .and_then(|runner| runner.run(seed))
        .map_err(|e| e.to_string())?;

    let json = serde_json::to_string_pretty(&metrics).map_err(|e| e.to_string())?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            std::fs::write(&path, json).map_err(|e| e.to_string())?;
            info!(path = %path.display(), "Metrics written");
        }
        None => println!("{json}"),
    }

    info!(
        ticks = metrics.ticks,
        max_altitude = metrics.max_altitude,
        min_altitude = metrics.min_altitude,
        damage = metrics.total_damage(),
        failures = metrics.failures.len(),
        hash = metrics.final_state_hash,
        "Flight summary"
    );
    Ok(ExitCode::SUCCESS)
}

/// Fly a batch of seeds
fn cmd_batch(
    scenario: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
) -> Result<ExitCode, String> {
    let num_cpus = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    info!(
        scenario = %scenario,
        count,
        parallel,
        seed,
        output = %output.display(),
        cpus_available = num_cpus,
        "Batch configuration"
    );

    let config = BatchConfig::new(scenario, count)
        .with_output(output)
        .with_seed(seed)
        .with_parallelism(parallel);
    let results = run_batch(config).map_err(|e| e.to_string())?;

    let path = results.default_path();
    results
        .save(&path)
        .map_err(|e| format!("Failed to save results to {}: {e}", path.display()))?;

    let summary = &results.summary;
    info!(
        flights = summary.total_flights,
        disabled = summary.disabled_flights,
        avg_max_altitude = summary.avg_max_altitude,
        min_altitude = summary.min_altitude,
        avg_overheat_seconds = summary.avg_overheat_seconds,
        avg_total_damage = summary.avg_total_damage,
        distinct_hashes = summary.distinct_final_hashes,
        errors = results.errors.len(),
        path = %path.display(),
        "Batch results"
    );

    if results.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32) -> Result<ExitCode, String> {
    info!(scenario = %scenario, seed, runs, "Verifying determinism");

    if verify_determinism(scenario, seed, runs).map_err(|e| e.to_string())? {
        info!("Determinism verified: all {runs} runs produced the same final hash");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Determinism check failed: runs diverged");
        Ok(ExitCode::FAILURE)
    }
}
