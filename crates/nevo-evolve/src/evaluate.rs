//! Evaluation: driving brains across question streams
//!
//! Every brain in a generation replays the identical pre-generated question
//! streams, so fitness differences come from the brains alone. Brains share
//! no mutable state during evaluation, which is what allows the per-brain
//! loop to fan out over threads.

use rand::rngs::StdRng;
use rand::SeedableRng;

use nevo_brain::Brain;
use nevo_genome::NUM_INPUTS;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::task::Question;

/// Input slot carrying the positive example x coordinate
pub const SLOT_POS_X: usize = 0;
/// Input slot carrying the running score
pub const SLOT_SCORE: usize = 6;
/// Input slot carrying the thinking clock
pub const SLOT_CLOCK: usize = 7;
/// Input slot carrying the constant bias
pub const SLOT_BIAS: usize = 8;

/// Evaluate one brain on one task's question stream
///
/// The brain is reset first: weights are re-seeded from the compiled
/// initial weights plus noise from `rng`, and all unit state is zeroed.
/// Returns the number of correctly answered questions.
pub fn evaluate_brain<R: rand::Rng + ?Sized>(
    brain: &mut Brain,
    questions: &[Question],
    rng: &mut R,
) -> u32 {
    brain.play_init(rng);
    let steps = brain.thinking_steps().max(1);
    let thinking_time = brain.thinking_time();
    let mut score: u32 = 0;

    for question in questions {
        let mut inputs = [0.0f32; NUM_INPUTS];
        inputs[SLOT_POS_X] = question.pos.0;
        inputs[1] = question.pos.1;
        inputs[2] = question.neg.0;
        inputs[3] = question.neg.1;
        inputs[4] = question.query.0;
        inputs[5] = question.query.1;
        let running = score as f32;
        inputs[SLOT_SCORE] = if running.is_finite() { running } else { 0.0 };
        inputs[SLOT_BIAS] = 1.0;

        for t in 0..steps {
            inputs[SLOT_CLOCK] = t as f32 / thinking_time;
            brain.step(&inputs);
        }

        let answer = brain.output() >= 0.0;
        if answer == question.target {
            score += 1;
        }
    }
    score
}

/// Per-brain reset RNG, derived so results do not depend on evaluation order
fn reset_rng(base_seed: u64, brain_ix: usize, task_ix: usize) -> StdRng {
    StdRng::seed_from_u64(
        base_seed ^ ((brain_ix as u64) << 32) ^ ((task_ix as u64).wrapping_mul(0x9e37_79b9)),
    )
}

/// Evaluate every brain across all task streams of a generation
///
/// Scores accumulate across tasks. With the `parallel` feature the brains
/// are evaluated on a rayon pool; the derived reset seeds keep the result
/// identical to the sequential path.
pub fn evaluate_pool(brains: &mut [Brain], tasks: &[Vec<Question>], base_seed: u64) -> Vec<u32> {
    let eval_one = |brain_ix: usize, brain: &mut Brain| -> u32 {
        tasks
            .iter()
            .enumerate()
            .map(|(task_ix, questions)| {
                let mut rng = reset_rng(base_seed, brain_ix, task_ix);
                evaluate_brain(brain, questions, &mut rng)
            })
            .sum()
    };

    #[cfg(feature = "parallel")]
    {
        brains
            .par_iter_mut()
            .enumerate()
            .map(|(ix, brain)| eval_one(ix, brain))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        brains
            .iter_mut()
            .enumerate()
            .map(|(ix, brain)| eval_one(ix, brain))
            .collect()
    }
}
