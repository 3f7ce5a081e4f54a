//! cachepull - CI build cache restore
//!
//! CLI entry point that dispatches to subcommands.

use cachepull::cli::{commands, Cli, Commands};
use cachepull::error::CachePullResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CachePullResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = info (per-key progress), 1 = debug, 2+ = trace
    let filter = match cli.verbose {
        0 => EnvFilter::new("cachepull=info"),
        1 => EnvFilter::new("cachepull=debug"),
        _ => EnvFilter::new("cachepull=trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Restore(args) => commands::restore(args),
        Commands::Keys(args) => commands::keys(args),
        Commands::Check(args) => commands::check(args),
    }
}
