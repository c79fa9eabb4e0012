//! devforge CLI - configuration-driven local PHP stack provisioning
//!
//! This is the main entry point for the devforge command-line interface.

mod cli;
mod commands;
mod report;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    // Run command
    match cli.command {
        Commands::Provision(args) => commands::provision::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()).await,
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Version(args) => commands::version::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Default to warn: the run log carries user-facing progress
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
