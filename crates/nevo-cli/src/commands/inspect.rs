//! Pool inspection command

use std::path::PathBuf;

use clap::Args;

use nevo_genome::read_pool;

use crate::commands::POOL_FILE;
use crate::config::EngineConfig;
use crate::error::{CliError, CliResult};

/// Print a human-readable view of the genepool
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Workspace directory holding genepool.dat
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file path (defaults to <dir>/nevo.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl InspectCommand {
    /// Execute the command
    pub fn execute(self) -> CliResult<()> {
        let config = EngineConfig::resolve(&self.dir, self.config.as_deref())?;
        let pool_path = self.dir.join(POOL_FILE);
        if !pool_path.exists() {
            return Err(CliError::missing_resource(pool_path.display().to_string()));
        }
        let genomes = read_pool(&pool_path, config.pool_size)?;

        println!("genepool: {} ({} genomes)", pool_path.display(), genomes.len());
        for (slot, genome) in genomes.iter().enumerate() {
            println!("[{:3}] {}", slot, genome.summary());
        }

        let total_len: usize = genomes.iter().map(|g| g.len()).sum();
        let mean_lr: f32 =
            genomes.iter().map(|g| g.learning_rate).sum::<f32>() / genomes.len() as f32;
        let mean_tt: f32 =
            genomes.iter().map(|g| g.thinking_time).sum::<f32>() / genomes.len() as f32;
        println!(
            "mean length {:.1}, mean lr {:.3}, mean thinking time {:.1}",
            total_len as f32 / genomes.len() as f32,
            mean_lr,
            mean_tt
        );
        Ok(())
    }
}
