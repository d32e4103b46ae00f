use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Commit activity research toolkit
#[derive(Parser)]
#[command(name = "commit-activity-research")]
#[command(about = "Weekly commit activity, cohort and outlier analysis")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run analysis on a commit dataset
    Analyse(commands::analysis::AnalyseCommand),
}

pub fn run() -> AppResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyse(command) => command.run(),
    }
}
