//! CLI for the compute benchmarks
//!
//! Supports three commands:
//! - run: Run one test, or every registered test with its predefined cases
//! - list: Show registered tests and their arguments
//! - devices: Show the devices each compute API can open

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "compute-benchmarks")]
#[command(about = "Compute API microbenchmarks", long_about = None)]
#[command(version)]
struct Cli {
    /// Debug-level logging on stderr
    #[arg(long, global = true)]
    verbose_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run benchmarks and print their statistics
    Run(commands::run::RunArgs),

    /// List registered benchmarks
    List(commands::list::ListArgs),

    /// Show devices reachable through each compute API
    Devices(commands::devices::DevicesArgs),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose_logs);

    match cli.command {
        Commands::Run(args) => {
            let worst = commands::run::run(args)?;
            Ok(ExitCode::from(worst.exit_code() as u8))
        }
        Commands::List(args) => {
            commands::list::run(args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Devices(args) => {
            commands::devices::run(args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Results go to stdout, so logs are written to stderr.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
