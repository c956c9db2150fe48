//! The brain construction VM
//!
//! Compilation runs a two-stack machine over the genome's command tape. Each
//! stack bottoms out at the permanent sentinel unit 1 and never empties;
//! connection opcodes address units relative to the top of the relevant
//! stack. Unit IDs are handed out sequentially, so an insertion or removal
//! of a single command shifts the wiring only locally, which is what keeps
//! the encoding evolvable.

use rand::Rng;

use nevo_genome::{
    Genome, Opcode, SumsiId, WeightId, ARG_RAND_SUMSI, ARG_RAND_WEIGHT, NUM_INPUTS,
};

use crate::brain::Brain;
use crate::error::{BrainError, Result};
use crate::wiring::{CtrlSource, InSource, OutTarget, WeightConn};

/// Maximum number of weight units per brain
pub const MAX_WEIGHTS: usize = 10_000;

/// Maximum number of sumsi units per brain
pub const MAX_SUMSIS: usize = 100;

/// Incremental builder state: the two construction stacks plus the partially
/// wired connection table
#[derive(Debug)]
pub struct BrainBuilder {
    weight_stack: Vec<u32>,
    sumsi_stack: Vec<u32>,
    // Index 0 is the dummy "unconnected" slot; unit 1 is the sentinel.
    conns: Vec<WeightConn>,
    initial_weights: Vec<f32>,
    input_conn: [WeightId; NUM_INPUTS],
    output: SumsiId,
    num_sumsis: u32,
}

impl BrainBuilder {
    /// Create a builder with both sentinel units allocated
    pub fn new() -> Self {
        Self {
            weight_stack: vec![1],
            sumsi_stack: vec![1],
            conns: vec![WeightConn::default(); 2],
            initial_weights: vec![0.0; 2],
            input_conn: [WeightId::UNCONNECTED; NUM_INPUTS],
            output: SumsiId::UNCONNECTED,
            num_sumsis: 1,
        }
    }

    /// Number of weight units allocated so far (sentinel included)
    pub fn num_weights(&self) -> usize {
        self.conns.len() - 1
    }

    /// Number of sumsi units allocated so far (sentinel included)
    pub fn num_sumsis(&self) -> usize {
        self.num_sumsis as usize
    }

    /// Current weight-stack depth
    pub fn weight_depth(&self) -> usize {
        self.weight_stack.len()
    }

    /// Current sumsi-stack depth
    pub fn sumsi_depth(&self) -> usize {
        self.sumsi_stack.len()
    }

    /// The weight unit subsequent connection opcodes act on
    pub fn top_weight(&self) -> WeightId {
        // The stacks are seeded with the sentinel and pops stop above it.
        WeightId::new(self.weight_stack.last().copied().unwrap_or(1))
    }

    /// The sumsi unit subsequent connection opcodes act on
    pub fn top_sumsi(&self) -> SumsiId {
        SumsiId::new(self.sumsi_stack.last().copied().unwrap_or(1))
    }

    /// Unit `arg` positions below the top of `stack`, if that deep
    fn peek(stack: &[u32], arg: i32) -> Option<u32> {
        if arg < 0 {
            return None;
        }
        let depth = arg as usize;
        if depth >= stack.len() {
            return None;
        }
        Some(stack[stack.len() - 1 - depth])
    }

    /// Execute one (already resolved) command
    ///
    /// Over-deep stack references and pops at the sentinel are silent no-ops;
    /// they are routine products of mutation and pruning them from the search
    /// space would be wrong. Capacity overflow and an out-of-range input
    /// index are errors.
    pub fn process_command(&mut self, op: Opcode, arg: i32) -> Result<()> {
        match op {
            Opcode::NewWeight => {
                let id = self.conns.len() as u32;
                self.conns.push(WeightConn::default());
                self.initial_weights.push(arg as f32 / 100.0);
                self.weight_stack.push(id);
                if self.num_weights() >= MAX_WEIGHTS {
                    return Err(BrainError::TooManyWeights { max: MAX_WEIGHTS });
                }
            }
            Opcode::NewSumsi => {
                self.num_sumsis += 1;
                self.sumsi_stack.push(self.num_sumsis);
                if self.num_sumsis() >= MAX_SUMSIS {
                    return Err(BrainError::TooManySumsis { max: MAX_SUMSIS });
                }
            }
            Opcode::SumsiToWeightIn => {
                if let Some(target) = Self::peek(&self.weight_stack, arg) {
                    self.conns[target as usize].input = InSource::Sumsi(self.top_sumsi());
                }
            }
            Opcode::SumsiToWeightCtrl => {
                if let Some(target) = Self::peek(&self.weight_stack, arg) {
                    self.conns[target as usize].ctrl = CtrlSource::SumsiOut(self.top_sumsi());
                }
            }
            Opcode::WeightToSumsiIn => {
                if let Some(target) = Self::peek(&self.sumsi_stack, arg) {
                    let source = self.top_weight();
                    self.conns[source.raw() as usize].output =
                        OutTarget::SumsiIn(SumsiId::new(target));
                }
            }
            Opcode::WeightToWeightCtrl => {
                if let Some(target) = Self::peek(&self.weight_stack, arg) {
                    let source = self.top_weight();
                    self.conns[source.raw() as usize].output =
                        OutTarget::WeightCtrl(WeightId::new(target));
                    self.conns[target as usize].ctrl = CtrlSource::WeightOut(source);
                }
            }
            Opcode::PopWeight => {
                if self.weight_stack.len() > 1 {
                    self.weight_stack.pop();
                }
            }
            Opcode::PopSumsi => {
                if self.sumsi_stack.len() > 1 {
                    self.sumsi_stack.pop();
                }
            }
            Opcode::WeightToInput => {
                if arg < 0 || arg as usize >= NUM_INPUTS {
                    return Err(BrainError::InvalidInputIndex {
                        index: arg,
                        num_inputs: NUM_INPUTS,
                    });
                }
                let slot = arg as usize;
                let target = self.top_weight();
                self.conns[target.raw() as usize].input = InSource::Global(slot);
                self.input_conn[slot] = target;
            }
            Opcode::SumsiToOut => {
                self.output = self.top_sumsi();
            }
        }
        Ok(())
    }

    /// Seal the builder into a runnable brain
    pub fn finish(self, learning_rate: f32, thinking_time: f32) -> Brain {
        let num_sumsis = self.num_sumsis as usize;
        Brain {
            weights: vec![0.0; self.conns.len()],
            weight_state: vec![0.0; self.conns.len()],
            sumsi_state: vec![0.0; num_sumsis + 1],
            conns: self.conns,
            initial_weights: self.initial_weights,
            input_conn: self.input_conn,
            output: self.output,
            learning_rate,
            thinking_time,
        }
    }
}

impl Default for BrainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a genome into a brain
///
/// Unresolved RAND_* sentinel arguments are rewritten in place to a uniform
/// sample over the relevant stack's depth at the moment the command runs, so
/// the first build fixes the realisation and every rebuild is deterministic.
pub fn build<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> Result<Brain> {
    genome.validate()?;
    let mut builder = BrainBuilder::new();
    for cmd in genome.commands.iter_mut() {
        if cmd.is_unresolved() {
            cmd.arg = if cmd.arg == ARG_RAND_WEIGHT {
                rng.gen_range(0..builder.weight_depth()) as i32
            } else {
                debug_assert_eq!(cmd.arg, ARG_RAND_SUMSI);
                rng.gen_range(0..builder.sumsi_depth()) as i32
            };
        }
        builder.process_command(cmd.op, cmd.arg)?;
    }
    Ok(builder.finish(genome.learning_rate, genome.thinking_time))
}
