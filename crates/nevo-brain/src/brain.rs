//! The compiled brain and its synchronous execution step
//!
//! One step runs four passes in a fixed order: gather inputs into the weight
//! units, multiply by the current weights, accumulate into the sumsi units
//! and apply the leaky linearity, then feed each control wire back into its
//! weight as an exponential moving average. The ordering is the contract:
//! pass 3 consumes values produced by pass 2 of the same step, and pass 4
//! reads state frozen after pass 3, so no unit ever sees a mid-step update.

use rand::Rng;

use nevo_genome::{SumsiId, WeightId, NUM_INPUTS};

use crate::wiring::{CtrlSource, InSource, OutTarget, WeightConn};

/// Half-width of the uniform noise added to every weight at play-init
pub const NOISE_AMPLITUDE: f32 = 0.01;

/// The leaky linearity applied to every sumsi after accumulation
#[inline]
pub fn leaky_linear(x: f32) -> f32 {
    if x < 0.0 {
        x / 10.0
    } else {
        x
    }
}

/// A materialised network, ready to think
///
/// All tables are 1-based with a dummy slot 0, mirroring the ID scheme where
/// 0 means "unconnected".
#[derive(Debug, Clone)]
pub struct Brain {
    pub(crate) conns: Vec<WeightConn>,
    pub(crate) initial_weights: Vec<f32>,
    pub(crate) input_conn: [WeightId; NUM_INPUTS],
    pub(crate) output: SumsiId,
    pub(crate) weights: Vec<f32>,
    pub(crate) weight_state: Vec<f32>,
    pub(crate) sumsi_state: Vec<f32>,
    pub(crate) learning_rate: f32,
    pub(crate) thinking_time: f32,
}

impl Brain {
    /// Number of weight units (sentinel included)
    pub fn num_weights(&self) -> usize {
        self.conns.len() - 1
    }

    /// Number of sumsi units (sentinel included)
    pub fn num_sumsis(&self) -> usize {
        self.sumsi_state.len() - 1
    }

    /// The learning rate baked in from the genome
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Number of runtime steps granted per question
    pub fn thinking_steps(&self) -> usize {
        self.thinking_time as usize
    }

    /// The raw thinking-time hyperparameter
    pub fn thinking_time(&self) -> f32 {
        self.thinking_time
    }

    /// The sumsi designated as the brain output (0 when unwired)
    pub fn output_id(&self) -> SumsiId {
        self.output
    }

    /// The full connection table (slot 0 is the dummy entry)
    pub fn connections(&self) -> &[WeightConn] {
        &self.conns
    }

    /// Initial weights as compiled from the genome (slot 0 is the dummy entry)
    pub fn initial_weights(&self) -> &[f32] {
        &self.initial_weights
    }

    /// Which weight unit each global input slot was last wired to
    pub fn input_conn(&self) -> &[WeightId; NUM_INPUTS] {
        &self.input_conn
    }

    /// Current weight of one unit
    pub fn weight(&self, id: WeightId) -> f32 {
        self.weights[id.raw() as usize]
    }

    /// Overwrite one unit's current weight
    pub fn set_weight(&mut self, id: WeightId, value: f32) {
        self.weights[id.raw() as usize] = value;
    }

    /// Reset the brain for a fresh evaluation
    ///
    /// Weights are re-seeded from the compiled initial weights plus a small
    /// uniform perturbation; all cached unit state is zeroed. Equal RNG
    /// seeds produce identical post-reset state.
    pub fn play_init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for (w, &init) in self.weights.iter_mut().zip(&self.initial_weights) {
            *w = init + rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
        }
        self.weight_state.iter_mut().for_each(|v| *v = 0.0);
        self.sumsi_state.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Advance the network by one synchronous step
    pub fn step(&mut self, inputs: &[f32; NUM_INPUTS]) {
        // Pass 1: gather data inputs. Unwired units keep their cached value.
        for i in 1..self.conns.len() {
            match self.conns[i].input {
                InSource::None => {}
                InSource::Global(slot) => self.weight_state[i] = inputs[slot],
                InSource::Sumsi(s) => self.weight_state[i] = self.sumsi_state[s.raw() as usize],
            }
        }

        // Pass 2: multiply by the current weights.
        for i in 1..self.conns.len() {
            self.weight_state[i] *= self.weights[i];
        }

        // Pass 3: accumulate into sumsis, then the leaky linearity.
        self.sumsi_state.iter_mut().for_each(|v| *v = 0.0);
        for i in 1..self.conns.len() {
            if let OutTarget::SumsiIn(s) = self.conns[i].output {
                self.sumsi_state[s.raw() as usize] += self.weight_state[i];
            }
        }
        for v in self.sumsi_state.iter_mut() {
            *v = leaky_linear(*v);
        }

        // Pass 4: control update, an EMA toward the control signal.
        let lr = self.learning_rate;
        for i in 1..self.conns.len() {
            let ctrl = match self.conns[i].ctrl {
                CtrlSource::None => continue,
                CtrlSource::WeightOut(w) => self.weight_state[w.raw() as usize],
                CtrlSource::SumsiOut(s) => self.sumsi_state[s.raw() as usize],
            };
            self.weights[i] = ctrl * lr + self.weights[i] * (1.0 - lr);
        }
    }

    /// The brain's scalar output after the latest step (0.0 when unwired)
    pub fn output(&self) -> f32 {
        if self.output.is_connected() {
            self.sumsi_state[self.output.raw() as usize]
        } else {
            0.0
        }
    }
}
