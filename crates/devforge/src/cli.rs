//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// devforge - provision a local PHP development stack from config.json
#[derive(Parser, Debug)]
#[command(name = "devforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress diagnostic output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to config.json
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision the enabled components
    Provision(ProvisionArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show which stack components this machine already has
    Status(StatusArgs),

    /// Show version information
    Version(VersionArgs),
}

// Provision command
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Show the plan without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Restrict the run to the named components (php, redis, mariadb, laravel)
    #[arg(long)]
    pub only: Vec<String>,
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter config.json
    Init(ConfigInitArgs),

    /// Validate the configuration
    Validate(ConfigValidateArgs),

    /// Show the resolved configuration
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Project name used for the Laravel component
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = "config.json")]
    pub output: Utf8PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Path to config file (default: ./config.json)
    #[arg(short, long)]
    pub file: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
