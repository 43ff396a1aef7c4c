//! Command-line argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Qualitative Comparative Analysis engine
#[derive(Debug, Parser)]
#[command(name = "qca", version, about)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full analysis pipeline
    Run(RunArgs),
    /// Validate a configuration without running anything
    Validate(ConfigArgs),
    /// Print the resolved conditions and outcomes of a configuration
    Inspect(ConfigArgs),
}

/// Arguments shared by commands that only need a configuration
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Path to the configuration file (.toml or .json)
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Arguments for `qca run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the configuration file (.toml or .json)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override the configured output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Override the configured truth-table mode (crisp, fuzzy or dual)
    #[arg(long)]
    pub mode: Option<String>,
}
