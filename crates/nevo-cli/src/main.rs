//! # nevo CLI - neuroevolution of stack-machine brains
//!
//! Command-line front end to the nevo engine: initialise a genepool, run
//! the evolutionary loop (optionally exchanging elites with a sibling
//! process), and inspect the persisted pool.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod peer;

use commands::NevoCli;
use error::CliResult;

fn main() -> CliResult<()> {
    // Initialize logging with environment variable support
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Parse CLI arguments
    let cli = NevoCli::parse();

    // Execute the command
    if let Err(err) = cli.execute() {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }

    Ok(())
}
