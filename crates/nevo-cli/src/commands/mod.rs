//! CLI command implementations for nevo

use clap::{Parser, Subcommand};

use crate::error::CliResult;

pub mod init;
pub mod inspect;
pub mod run;

/// Name of the pool file within the workspace directory
pub const POOL_FILE: &str = "genepool.dat";

/// nevo - evolving stack-machine brains on wavy classification tasks
#[derive(Parser, Debug)]
#[command(
    name = "nevo",
    version,
    about = "Neuroevolution engine for stack-machine-encoded brains",
    long_about = "nevo evolves a pool of gene programs whose stack-machine \
                  tapes compile into small self-modifying networks. Each \
                  generation the networks answer on-line classification \
                  questions over random sinusoidal surfaces; the worst are \
                  overwritten by mutated clones and crossover children of \
                  the best, and the pool is persisted between runs."
)]
pub struct NevoCli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the evolutionary loop
    Run(run::RunCommand),

    /// Create a fresh genepool without running
    #[command(alias = "new")]
    Init(init::InitCommand),

    /// Print a human-readable view of the genepool
    Inspect(inspect::InspectCommand),
}

impl NevoCli {
    /// Execute the CLI command
    pub fn execute(self) -> CliResult<()> {
        match self.command {
            Commands::Run(cmd) => cmd.execute(),
            Commands::Init(cmd) => cmd.execute(),
            Commands::Inspect(cmd) => cmd.execute(),
        }
    }
}
