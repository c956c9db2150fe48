//! The genepool: scoring, rank selection and slot regeneration
//!
//! Selection is rank-based with elitism. After an ascending fitness sort,
//! the worst slots form the kill zone: its two worst slots receive the
//! crossover children, the rest are overwritten by mutated clones of the
//! best genomes in parallel order. Everything between the kill zone and the
//! breeders survives untouched. Brains are rebuilt every generation since
//! their weights re-randomise on evaluation anyway.

use rand::Rng;

use nevo_brain::{build, Brain};
use nevo_genome::Genome;

use crate::crossover::crossover;
use crate::error::{EvolveError, Result};
use crate::evaluate::evaluate_pool;
use crate::mutate::{mutate, mutate_clone};
use crate::task::{Question, TaskSurface};

/// Retry budget when a slot refuses to produce a buildable genome
const REGEN_ATTEMPTS: usize = 16;

/// Retry budget for crossover window draws
const CROSSOVER_ATTEMPTS: usize = 8;

/// Sizing and scoring parameters of the evolutionary loop
#[derive(Debug, Clone, PartialEq)]
pub struct EvolveParams {
    /// Number of genomes (and brains) in the pool
    pub pool_size: usize,
    /// Number of slots that survive each generation
    pub pool_keep: usize,
    /// Tasks evaluated per generation
    pub tasks_per_generation: usize,
    /// Questions per task
    pub questions_per_task: usize,
    /// Fitness penalty per gene (with tie-breaking jitter)
    pub length_penalty: f32,
    /// Fitness penalty per unit of thinking time
    pub time_penalty: f32,
}

impl Default for EvolveParams {
    fn default() -> Self {
        Self {
            pool_size: 32,
            pool_keep: 24,
            tasks_per_generation: 3,
            questions_per_task: 600,
            length_penalty: 0.05,
            time_penalty: 0.05,
        }
    }
}

impl EvolveParams {
    /// Number of slots overwritten each generation
    pub fn kill_zone(&self) -> usize {
        self.pool_size - self.pool_keep
    }

    /// Number of genomes cloned from each generation
    pub fn breeder_zone(&self) -> usize {
        self.kill_zone() - 2
    }

    /// Check the parameter invariants
    pub fn validate(&self) -> Result<()> {
        if self.pool_size < 4 {
            return Err(EvolveError::invalid_parameter(
                "pool_size",
                self.pool_size,
                ">= 4",
            ));
        }
        if self.pool_keep >= self.pool_size {
            return Err(EvolveError::invalid_parameter(
                "pool_keep",
                self.pool_keep,
                "< pool_size",
            ));
        }
        if self.kill_zone() < 3 {
            return Err(EvolveError::invalid_parameter(
                "pool_keep",
                self.pool_keep,
                "pool_size - pool_keep >= 3 (two crossover targets plus a clone slot)",
            ));
        }
        if self.breeder_zone() > self.pool_keep {
            return Err(EvolveError::invalid_parameter(
                "pool_keep",
                self.pool_keep,
                "breeder zone must fit within the kept slots",
            ));
        }
        if self.tasks_per_generation == 0 {
            return Err(EvolveError::invalid_parameter(
                "tasks_per_generation",
                self.tasks_per_generation,
                ">= 1",
            ));
        }
        if self.questions_per_task == 0 {
            return Err(EvolveError::invalid_parameter(
                "questions_per_task",
                self.questions_per_task,
                ">= 1",
            ));
        }
        if self.length_penalty < 0.0 || self.time_penalty < 0.0 {
            return Err(EvolveError::invalid_parameter(
                "penalty",
                format!("{}/{}", self.length_penalty, self.time_penalty),
                ">= 0",
            ));
        }
        Ok(())
    }
}

/// One generation's headline numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    /// Generation counter after this step
    pub generation: u64,
    /// Slot holding the best genome
    pub best_slot: usize,
    /// Best penalised fitness
    pub best_fitness: f32,
    /// Mean penalised fitness across the pool
    pub mean_fitness: f32,
    /// Best raw correct-answer count
    pub best_score: u32,
    /// Tape length of the best genome
    pub best_length: usize,
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gen {}: best {:.2} (score {}, len {}) mean {:.2}",
            self.generation, self.best_fitness, self.best_score, self.best_length, self.mean_fitness
        )
    }
}

/// The population of genomes and their compiled brains
#[derive(Debug)]
pub struct Pool {
    params: EvolveParams,
    genomes: Vec<Genome>,
    brains: Vec<Brain>,
    fitness: Vec<f32>,
    generation: u64,
}

impl Pool {
    /// Create a fresh pool: one seed plus one mutation per slot
    pub fn fresh<R: Rng + ?Sized>(params: EvolveParams, rng: &mut R) -> Result<Self> {
        params.validate()?;
        let genomes = (0..params.pool_size)
            .map(|_| {
                let mut genome = Genome::seed();
                mutate(&mut genome, rng);
                genome
            })
            .collect();
        Self::from_genomes(params, genomes, rng)
    }

    /// Adopt a loaded set of genomes, building every brain
    ///
    /// A genome that fails to build is discarded and its slot re-seeded;
    /// only a size mismatch is fatal.
    pub fn from_genomes<R: Rng + ?Sized>(
        params: EvolveParams,
        genomes: Vec<Genome>,
        rng: &mut R,
    ) -> Result<Self> {
        params.validate()?;
        if genomes.len() != params.pool_size {
            return Err(nevo_genome::GenomeError::PoolSizeMismatch {
                found: genomes.len(),
                expected: params.pool_size,
            }
            .into());
        }
        let mut pool = Self {
            fitness: vec![0.0; params.pool_size],
            brains: Vec::with_capacity(params.pool_size),
            params,
            genomes,
            generation: 0,
        };
        for slot in 0..pool.params.pool_size {
            let brain = pool.build_slot(slot, rng)?;
            pool.brains.push(brain);
        }
        Ok(pool)
    }

    /// Evolver parameters
    pub fn params(&self) -> &EvolveParams {
        &self.params
    }

    /// All genomes, slot order
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Generations completed so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Latest per-slot fitness (zeros before the first generation)
    pub fn fitness(&self) -> &[f32] {
        &self.fitness
    }

    /// The best genome by latest fitness (slot 0 before the first generation)
    pub fn best_genome(&self) -> &Genome {
        &self.genomes[self.best_slot()]
    }

    /// Slot of the best genome by latest fitness
    pub fn best_slot(&self) -> usize {
        self.fitness
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(ix, _)| ix)
            .unwrap_or(0)
    }

    /// Run one full generation: evaluate, score, select, regenerate
    pub fn run_generation<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<GenerationSummary> {
        let tasks = self.generate_tasks(rng)?;
        let scores = evaluate_pool(&mut self.brains, &tasks, rng.gen());

        let penalties: Vec<f32> = self
            .genomes
            .iter()
            .map(|genome| self.penalty(genome, rng))
            .collect();
        for slot in 0..self.params.pool_size {
            self.fitness[slot] = scores[slot] as f32 - penalties[slot];
        }

        let summary = self.summarise(&scores);
        let fitness = self.fitness.clone();
        self.select(&fitness, rng)?;
        self.generation += 1;
        Ok(summary)
    }

    /// Apply rank selection for the given fitness vector and rebuild brains
    ///
    /// Split out from [`run_generation`](Self::run_generation) so the
    /// selection geometry can be exercised with synthetic fitness.
    pub fn select<R: Rng + ?Sized>(&mut self, fitness: &[f32], rng: &mut R) -> Result<()> {
        assert_eq!(fitness.len(), self.params.pool_size);
        let n = self.params.pool_size;
        let kill = self.params.kill_zone();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
        let best = order[n - 1];
        let cross_targets = [order[0], order[1]];

        // Clone the breeders over the remaining kill slots, best first.
        for j in 0..(kill - 2) {
            let dst = order[2 + j];
            let src = order[n - 1 - j];
            let mut clone = self.genomes[src].clone();
            mutate_clone(&mut clone, rng);
            self.genomes[dst] = clone;
        }

        // Crossover: the best against a random other genome.
        let partner = loop {
            let p = rng.gen_range(0..n);
            if p != best && !cross_targets.contains(&p) {
                break p;
            }
        };
        let mut placed = false;
        for _ in 0..CROSSOVER_ATTEMPTS {
            match crossover(&self.genomes[best], &self.genomes[partner], rng) {
                Ok((c1, c2)) => {
                    self.genomes[cross_targets[0]] = c1;
                    self.genomes[cross_targets[1]] = c2;
                    placed = true;
                    break;
                }
                Err(e) => log::warn!("crossover rejected: {}", e),
            }
        }
        if !placed {
            // Window draws kept overflowing the gene capacity; fall back to
            // clones of the best so the slots are not wasted.
            for &dst in &cross_targets {
                let mut clone = self.genomes[best].clone();
                mutate_clone(&mut clone, rng);
                self.genomes[dst] = clone;
            }
        }

        // Rebuild every brain; evaluation re-randomises weights anyway.
        for slot in 0..n {
            self.brains[slot] = self.build_slot(slot, rng)?;
        }
        Ok(())
    }

    /// Structural penalty subtracted from the raw score
    fn penalty<R: Rng + ?Sized>(&self, genome: &Genome, rng: &mut R) -> f32 {
        (genome.len() as f32 + rng.gen::<f32>()) * self.params.length_penalty
            + genome.thinking_time * self.params.time_penalty
    }

    fn generate_tasks<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Vec<Question>>> {
        (0..self.params.tasks_per_generation)
            .map(|_| {
                let surface = TaskSurface::generate(rng)?;
                Ok(surface.question_stream(rng, self.params.questions_per_task))
            })
            .collect()
    }

    fn summarise(&self, scores: &[u32]) -> GenerationSummary {
        let best_slot = self.best_slot();
        GenerationSummary {
            generation: self.generation + 1,
            best_slot,
            best_fitness: self.fitness[best_slot],
            mean_fitness: self.fitness.iter().sum::<f32>() / self.fitness.len() as f32,
            best_score: scores[best_slot],
            best_length: self.genomes[best_slot].len(),
        }
    }

    /// Build one slot's brain, discarding and re-deriving the genome on failure
    fn build_slot<R: Rng + ?Sized>(&mut self, slot: usize, rng: &mut R) -> Result<Brain> {
        match build(&mut self.genomes[slot], rng) {
            Ok(brain) => return Ok(brain),
            Err(e) => log::warn!("slot {}: discarding unbuildable genome: {}", slot, e),
        }
        let source = self.best_genome().clone();
        for _ in 0..REGEN_ATTEMPTS {
            let mut clone = source.clone();
            mutate_clone(&mut clone, rng);
            if let Ok(brain) = build(&mut clone, rng) {
                self.genomes[slot] = clone;
                return Ok(brain);
            }
        }
        // Even the best genome's mutants refuse to build; fall back to the
        // seed, which always compiles.
        let mut seed = Genome::seed();
        match build(&mut seed, rng) {
            Ok(brain) => {
                self.genomes[slot] = seed;
                Ok(brain)
            }
            Err(_) => Err(EvolveError::SlotRegeneration {
                slot,
                attempts: REGEN_ATTEMPTS,
            }),
        }
    }

    /// Adopt an elite genome from a peer, replacing the weakest slot
    ///
    /// Returns the slot it landed in. A genome that fails to build is
    /// rejected with the build error and the pool is left untouched.
    pub fn inject_elite<R: Rng + ?Sized>(
        &mut self,
        mut genome: Genome,
        rng: &mut R,
    ) -> Result<usize> {
        genome.validate()?;
        let brain = build(&mut genome, rng)?;
        let slot = self
            .fitness
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(ix, _)| ix)
            .unwrap_or(0);
        self.genomes[slot] = genome;
        self.brains[slot] = brain;
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nevo_genome::{Command, Opcode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_params() -> EvolveParams {
        EvolveParams {
            pool_size: 8,
            pool_keep: 5,
            tasks_per_generation: 1,
            questions_per_task: 20,
            ..EvolveParams::default()
        }
    }

    /// A genome tagged by tape length and thinking time so slots stay
    /// distinguishable through selection
    fn tagged_genome(tag: usize) -> Genome {
        let mut genome = Genome::seed();
        for _ in 0..tag {
            genome.commands.insert(0, Command::new(Opcode::NewWeight, 7));
        }
        genome.thinking_time = 40.0 + tag as f32;
        genome
    }

    #[test]
    fn test_params_validation() {
        assert!(EvolveParams::default().validate().is_ok());

        let bad = EvolveParams {
            pool_keep: 31,
            ..EvolveParams::default()
        };
        assert!(bad.validate().is_err());

        let bad = EvolveParams {
            pool_size: 2,
            pool_keep: 1,
            ..EvolveParams::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_fresh_pool_is_fully_built() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = Pool::fresh(small_params(), &mut rng).unwrap();
        assert_eq!(pool.genomes().len(), 8);
        assert_eq!(pool.brains.len(), 8);
        for genome in pool.genomes() {
            assert!(genome.validate().is_ok());
        }
    }

    #[test]
    fn test_pool_size_mismatch_is_fatal() {
        let mut rng = StdRng::seed_from_u64(2);
        let genomes = vec![Genome::seed(); 5];
        let err = Pool::from_genomes(small_params(), genomes, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            EvolveError::Genome {
                source: nevo_genome::GenomeError::PoolSizeMismatch { .. }
            }
        ));
    }

    #[test]
    fn test_selection_sweep_geometry() {
        // Pool of 8, keep 5: slots 0,1,2 by ascending fitness are the kill
        // zone; 0 and 1 take the crossover children, 2 takes a clone of the
        // best; 3..7 survive untouched.
        let mut rng = StdRng::seed_from_u64(3);
        let genomes: Vec<Genome> = (0..8).map(tagged_genome).collect();
        let before = genomes.clone();
        let mut pool = Pool::from_genomes(small_params(), genomes, &mut rng).unwrap();

        let fitness: Vec<f32> = (0..8).map(|i| i as f32).collect();
        pool.select(&fitness, &mut rng).unwrap();

        // Middle zone and breeders are byte-identical.
        for slot in 3..8 {
            assert_eq!(pool.genomes()[slot], before[slot], "slot {}", slot);
        }
        // Kill-zone slots were all overwritten.
        for slot in 0..3 {
            assert_ne!(pool.genomes()[slot], before[slot], "slot {}", slot);
        }
    }

    #[test]
    fn test_best_genome_survives_selection() {
        let mut rng = StdRng::seed_from_u64(4);
        let genomes: Vec<Genome> = (0..8).map(tagged_genome).collect();
        let best_before = genomes[5].clone();
        let mut pool = Pool::from_genomes(small_params(), genomes, &mut rng).unwrap();

        // Slot 5 is the fittest this time.
        let fitness = vec![3.0, 1.0, 2.0, 4.0, 0.0, 9.0, 5.0, 6.0];
        pool.select(&fitness, &mut rng).unwrap();
        assert_eq!(pool.genomes()[5], best_before);
    }

    #[test]
    fn test_run_generation_produces_summary() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = Pool::fresh(small_params(), &mut rng).unwrap();
        let summary = pool.run_generation(&mut rng).unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(pool.generation(), 1);
        assert!(summary.best_score <= 20);
        assert!(summary.best_fitness >= summary.mean_fitness);
    }

    #[test]
    fn test_inject_elite_replaces_weakest_slot() {
        let mut rng = StdRng::seed_from_u64(6);
        let genomes: Vec<Genome> = (0..8).map(tagged_genome).collect();
        let mut pool = Pool::from_genomes(small_params(), genomes, &mut rng).unwrap();
        pool.fitness = vec![5.0, 1.0, 2.0, 4.0, 0.5, 9.0, 5.0, 6.0];

        let elite = tagged_genome(11);
        let slot = pool.inject_elite(elite.clone(), &mut rng).unwrap();
        assert_eq!(slot, 4);
        assert_eq!(pool.genomes()[4], elite);
    }
}
