//! Fresh-pool initialisation command

use std::path::PathBuf;

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use nevo_evolve::Pool;
use nevo_genome::write_pool;

use crate::commands::POOL_FILE;
use crate::config::EngineConfig;
use crate::error::{CliError, CliResult};

/// Create a fresh genepool without running
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Workspace directory to create the pool in
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file path (defaults to <dir>/nevo.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// RNG seed for a reproducible pool
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overwrite an existing genepool
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the command
    pub fn execute(self) -> CliResult<()> {
        let config = EngineConfig::resolve(&self.dir, self.config.as_deref())?;
        let pool_path = self.dir.join(POOL_FILE);
        if pool_path.exists() && !self.force {
            return Err(CliError::invalid_args(format!(
                "{} already exists (pass --force to overwrite)",
                pool_path.display()
            )));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        std::fs::create_dir_all(&self.dir)?;
        let pool = Pool::fresh(config.evolve_params(), &mut rng)?;
        write_pool(&pool_path, pool.genomes())?;
        info!(
            "wrote fresh pool of {} genomes to {}",
            pool.genomes().len(),
            pool_path.display()
        );
        Ok(())
    }
}
