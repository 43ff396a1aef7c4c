//! qca - Qualitative Comparative Analysis engine CLI.

use clap::Parser;
use qca_cli::commands;
use qca_cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => commands::execute_run(args),
        Command::Validate(args) => commands::execute_validate(args),
        Command::Inspect(args) => commands::execute_inspect(args),
    }
}
