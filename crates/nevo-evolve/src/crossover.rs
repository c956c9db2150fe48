//! Genetic crossover between two genomes
//!
//! A contiguous window, chosen as a fraction of each parent's length, is
//! swapped between the parents to produce two children. Hyperparameters are
//! blended in proportion to the window size, so a tiny snip leaves each
//! child close to its primary parent.

use rand::Rng;

use nevo_genome::{Genome, MAX_GENES};

use crate::error::{EvolveError, Result};

/// Upper bound (exclusive) on the relative window length
pub const MAX_SNIP: f32 = 0.8;

/// Swap windows at explicit fractions; exposed for property tests
pub fn crossover_at(p1: &Genome, p2: &Genome, start: f32, snip: f32) -> Result<(Genome, Genome)> {
    let cut = |len: usize, frac: f32| -> usize { (len as f32 * frac) as usize };

    let (a1, b1) = (cut(p1.len(), start), cut(p1.len(), start + snip));
    let (a2, b2) = (cut(p2.len(), start), cut(p2.len(), start + snip));

    let mut c1 = Vec::with_capacity(a1 + (b2 - a2) + (p1.len() - b1));
    c1.extend_from_slice(&p1.commands[..a1]);
    c1.extend_from_slice(&p2.commands[a2..b2]);
    c1.extend_from_slice(&p1.commands[b1..]);

    let mut c2 = Vec::with_capacity(a2 + (b1 - a1) + (p2.len() - b2));
    c2.extend_from_slice(&p2.commands[..a2]);
    c2.extend_from_slice(&p1.commands[a1..b1]);
    c2.extend_from_slice(&p2.commands[b2..]);

    for child in [&c1, &c2] {
        if child.len() > MAX_GENES {
            return Err(EvolveError::CrossoverOverflow {
                length: child.len(),
                max: MAX_GENES,
            });
        }
    }

    let blend = |x1: f32, x2: f32| x1 * (1.0 - snip) + x2 * snip;
    let child1 = Genome::new(c1, blend(p1.learning_rate, p2.learning_rate), blend(p1.thinking_time, p2.thinking_time));
    let child2 = Genome::new(c2, blend(p2.learning_rate, p1.learning_rate), blend(p2.thinking_time, p1.thinking_time));
    Ok((child1, child2))
}

/// Cross two parents at random fractions
pub fn crossover<R: Rng + ?Sized>(p1: &Genome, p2: &Genome, rng: &mut R) -> Result<(Genome, Genome)> {
    let snip = rng.gen_range(0.0..MAX_SNIP);
    let start = rng.gen_range(0.0..(1.0 - snip));
    crossover_at(p1, p2, start, snip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nevo_genome::{Command, Opcode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tape(len: usize, weight: i32) -> Genome {
        let commands = (0..len)
            .map(|_| Command::new(Opcode::NewWeight, weight))
            .collect();
        Genome::new(commands, 0.8, 40.0)
    }

    #[test]
    fn test_window_contents_swap() {
        let p1 = tape(10, 1);
        let p2 = tape(10, 2);
        let (c1, c2) = crossover_at(&p1, &p2, 0.2, 0.3).unwrap();

        // Windows are [2, 5) on both sides.
        assert_eq!(c1.len(), 10);
        assert_eq!(c2.len(), 10);
        for (ix, cmd) in c1.commands.iter().enumerate() {
            let expected = if (2..5).contains(&ix) { 2 } else { 1 };
            assert_eq!(cmd.arg, expected, "child1 index {}", ix);
        }
        for (ix, cmd) in c2.commands.iter().enumerate() {
            let expected = if (2..5).contains(&ix) { 1 } else { 2 };
            assert_eq!(cmd.arg, expected, "child2 index {}", ix);
        }
    }

    #[test]
    fn test_child_length_formula() {
        let p1 = tape(13, 1);
        let p2 = tape(7, 2);
        let (start, snip) = (0.25, 0.5);
        let (c1, c2) = crossover_at(&p1, &p2, start, snip).unwrap();

        let cut = |len: usize, frac: f32| (len as f32 * frac) as usize;
        let expected1 =
            cut(13, start) + cut(7, start + snip) - cut(7, start) + (13 - cut(13, start + snip));
        let expected2 =
            cut(7, start) + cut(13, start + snip) - cut(13, start) + (7 - cut(7, start + snip));
        assert_eq!(c1.len(), expected1);
        assert_eq!(c2.len(), expected2);
        // The swap conserves total length.
        assert_eq!(c1.len() + c2.len(), 20);
    }

    #[test]
    fn test_hyperparameter_blend() {
        let mut p1 = tape(10, 1);
        let mut p2 = tape(10, 2);
        p1.learning_rate = 1.0;
        p2.learning_rate = 0.5;
        p1.thinking_time = 40.0;
        p2.thinking_time = 20.0;

        let (c1, c2) = crossover_at(&p1, &p2, 0.1, 0.4).unwrap();
        assert!((c1.learning_rate - (1.0 * 0.6 + 0.5 * 0.4)).abs() < 1e-6);
        assert!((c2.learning_rate - (0.5 * 0.6 + 1.0 * 0.4)).abs() < 1e-6);
        assert!((c1.thinking_time - (40.0 * 0.6 + 20.0 * 0.4)).abs() < 1e-6);
        assert!((c2.thinking_time - (20.0 * 0.6 + 40.0 * 0.4)).abs() < 1e-6);
    }

    #[test]
    fn test_random_crossover_respects_bounds() {
        let p1 = tape(31, 1);
        let p2 = tape(17, 2);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let (c1, c2) = crossover(&p1, &p2, &mut rng).unwrap();
            assert_eq!(c1.len() + c2.len(), 48);
            assert!(c1.learning_rate > 0.0 && c1.learning_rate <= 1.0);
            assert!(c2.thinking_time >= 20.0);
        }
    }
}
