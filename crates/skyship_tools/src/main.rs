//! Skyship - Development Tools

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skyship-tools")]
#[command(about = "Development tools for skyship vehicle data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: String,
    },
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {path}");
            match skyship_tools::validate::validate_data_directory(std::path::Path::new(&path)) {
                Ok(report) if report.is_ok() => {
                    tracing::info!("Validation passed ({} files)", report.files_checked());
                    ExitCode::SUCCESS
                }
                Ok(report) => {
                    for problem in &report.problems {
                        println!("{problem}");
                    }
                    tracing::error!(
                        "Validation failed: {} problem(s) in {} files",
                        report.problems.len(),
                        report.files_checked()
                    );
                    ExitCode::FAILURE
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
