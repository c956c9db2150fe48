//! The main evolutionary loop command

use std::path::PathBuf;

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use nevo_evolve::Pool;
use nevo_genome::{read_pool, write_pool};

use crate::commands::POOL_FILE;
use crate::config::EngineConfig;
use crate::error::{CliError, CliResult};
use crate::peer::PeerLink;

/// Run the evolutionary loop
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Start from a fresh pool instead of loading genepool.dat
    #[arg(long)]
    pub fresh: bool,

    /// Peer process ID for signal-driven elite exchange
    #[arg(long)]
    pub peer: Option<i32>,

    /// Stop after this many generations (runs until killed when omitted)
    #[arg(long)]
    pub generations: Option<u64>,

    /// Workspace directory holding genepool.dat and xpol.dat
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file path (defaults to <dir>/nevo.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunCommand {
    /// Execute the command
    pub fn execute(self) -> CliResult<()> {
        let config = EngineConfig::resolve(&self.dir, self.config.as_deref())?;
        let params = config.evolve_params();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let pool_path = self.dir.join(POOL_FILE);
        let mut pool = if self.fresh {
            info!("initialising fresh pool of {} genomes", params.pool_size);
            Pool::fresh(params, &mut rng)?
        } else {
            if !pool_path.exists() {
                return Err(CliError::missing_resource(format!(
                    "{} (pass --fresh to create one)",
                    pool_path.display()
                )));
            }
            let genomes = read_pool(&pool_path, params.pool_size)?;
            info!("loaded {} genomes from {}", genomes.len(), pool_path.display());
            Pool::from_genomes(params, genomes, &mut rng)?
        };

        let mut peer_link = match self.peer {
            Some(pid) => Some(PeerLink::new(pid, &self.dir, config.exchange_interval)?),
            None => None,
        };

        loop {
            let summary = pool.run_generation(&mut rng)?;
            info!("{}", summary);
            write_pool(&pool_path, pool.genomes())?;

            if let Some(link) = peer_link.as_mut() {
                let generation = pool.generation();
                link.tick(&mut pool, generation, &mut rng)?;
            }

            if let Some(bound) = self.generations {
                if pool.generation() >= bound {
                    break;
                }
            }
        }

        info!("finished after {} generations", pool.generation());
        Ok(())
    }
}
