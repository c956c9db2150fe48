//! Mutation operators over gene programs
//!
//! One call applies a single edit drawn from a weighted categorical
//! distribution. Edits that would breach the gene capacity degrade to
//! no-ops instead of failing: mutation must always yield a buildable
//! genome, or the search would keep dying at its own frontier.

use rand::Rng;

use nevo_genome::{
    Command, Genome, Opcode, ARG_NONE, ARG_RAND_SUMSI, ARG_RAND_WEIGHT, MAX_GENES,
    MIN_THINKING_TIME, NUM_INPUTS,
};

/// Relative weights of the mutation modes, in mode order
const MODE_WEIGHTS: [u32; 13] = [1, 1, 2, 2, 1, 7, 3, 3, 3, 3, 2, 2, 1];

/// Insert a command at a uniform position over the inclusive range [0, len]
fn inject<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R, cmd: Command) {
    if genome.len() + 1 > MAX_GENES {
        return;
    }
    let at = rng.gen_range(0..=genome.len());
    genome.commands.insert(at, cmd);
}

/// Insert two commands at adjacent positions
fn inject_pair<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R, first: Command, second: Command) {
    if genome.len() + 2 > MAX_GENES {
        return;
    }
    let at = rng.gen_range(0..=genome.len());
    genome.commands.insert(at, second);
    genome.commands.insert(at, first);
}

/// Apply one random mutation to the genome
pub fn mutate<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) {
    let total: u32 = MODE_WEIGHTS.iter().sum();
    let mut pick = rng.gen_range(0..total);
    let mut mode = 0;
    for (ix, &weight) in MODE_WEIGHTS.iter().enumerate() {
        if pick < weight {
            mode = ix;
            break;
        }
        pick -= weight;
    }

    match mode {
        0 => {
            genome.learning_rate =
                (genome.learning_rate * rng.gen_range(0.8..1.2)).min(1.0);
        }
        1 => inject(genome, rng, Command::new(Opcode::SumsiToOut, ARG_NONE)),
        2 => inject(genome, rng, Command::new(Opcode::PopWeight, ARG_NONE)),
        3 => inject(genome, rng, Command::new(Opcode::PopSumsi, ARG_NONE)),
        4 => {
            let slot = rng.gen_range(0..NUM_INPUTS) as i32;
            inject(genome, rng, Command::new(Opcode::WeightToInput, slot));
        }
        5 => {
            // Removal dominates the distribution so tapes do not only grow.
            if genome.len() > 1 {
                let at = rng.gen_range(0..genome.len());
                genome.commands.remove(at);
            }
        }
        6 => inject(
            genome,
            rng,
            Command::new(Opcode::SumsiToWeightIn, ARG_RAND_WEIGHT),
        ),
        7 => inject(
            genome,
            rng,
            Command::new(Opcode::SumsiToWeightCtrl, ARG_RAND_WEIGHT),
        ),
        8 => inject(
            genome,
            rng,
            Command::new(Opcode::WeightToWeightCtrl, ARG_RAND_WEIGHT),
        ),
        9 => inject(
            genome,
            rng,
            Command::new(Opcode::WeightToSumsiIn, ARG_RAND_SUMSI),
        ),
        10 => inject_pair(
            genome,
            rng,
            Command::new(Opcode::NewSumsi, ARG_NONE),
            Command::new(Opcode::WeightToSumsiIn, 0),
        ),
        11 => {
            let w100 = rng.gen_range(-100..=100);
            inject_pair(
                genome,
                rng,
                Command::new(Opcode::NewWeight, w100),
                Command::new(Opcode::SumsiToWeightIn, 0),
            );
        }
        _ => {
            genome.thinking_time =
                (genome.thinking_time * rng.gen_range(0.8..1.2)).max(MIN_THINKING_TIME);
        }
    }
}

/// Apply between 1 and 5 mutations, as the selection step does to clones
pub fn mutate_clone<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) {
    let times = rng.gen_range(1..=5);
    for _ in 0..times {
        mutate(genome, rng);
    }
}
