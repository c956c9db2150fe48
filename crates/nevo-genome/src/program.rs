//! Gene program representation
//!
//! A gene program is a flat tape of commands. Each command is an opcode plus
//! one `i32` argument; what the argument means depends on the opcode (a stack
//! depth, a global-input index, or a weight expressed as an integer count of
//! hundredths). Two negative values are reserved as unresolved-randomness
//! sentinels and are rewritten in place to concrete depths the first time the
//! genome is compiled.

use core::fmt;

use crate::error::{GenomeError, Result};

/// Number of global input slots fed to every brain each step
///
/// Slots 0-5 carry the positive example, negative example and query
/// coordinates; slot 6 the running score; slot 7 the thinking clock;
/// slot 8 a constant 1.0 bias.
pub const NUM_INPUTS: usize = 9;

/// Maximum number of commands a genome may hold
pub const MAX_GENES: usize = 50_000;

/// Lower bound on the thinking-time hyperparameter
pub const MIN_THINKING_TIME: f32 = 2.0;

/// Argument value for opcodes that ignore their argument
pub const ARG_NONE: i32 = -1;

/// Sentinel argument: resolve to a uniform random weight-stack depth at first build
pub const ARG_RAND_WEIGHT: i32 = -2;

/// Sentinel argument: resolve to a uniform random sumsi-stack depth at first build
pub const ARG_RAND_SUMSI: i32 = -3;

/// Construction opcodes understood by the brain builder
///
/// Wire codes 1-10 are stable and used verbatim in the genepool text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Allocate a weight unit and push it; arg is the initial weight x100
    NewWeight,
    /// Allocate a sumsi unit and push it
    NewSumsi,
    /// Wire the top sumsi's output into the input of the weight at depth-arg
    SumsiToWeightIn,
    /// Wire the top sumsi's output into the control of the weight at depth-arg
    SumsiToWeightCtrl,
    /// Wire the top weight's output into the sumsi at depth-arg
    WeightToSumsiIn,
    /// Wire the top weight's output into the control of the weight at depth-arg
    WeightToWeightCtrl,
    /// Pop the weight stack unless at the sentinel
    PopWeight,
    /// Pop the sumsi stack unless at the sentinel
    PopSumsi,
    /// Wire global input slot arg into the top weight's input
    WeightToInput,
    /// Designate the top sumsi as the brain output
    SumsiToOut,
}

impl Opcode {
    /// All opcodes in wire-code order
    pub const ALL: [Opcode; 10] = [
        Opcode::NewWeight,
        Opcode::NewSumsi,
        Opcode::SumsiToWeightIn,
        Opcode::SumsiToWeightCtrl,
        Opcode::WeightToSumsiIn,
        Opcode::WeightToWeightCtrl,
        Opcode::PopWeight,
        Opcode::PopSumsi,
        Opcode::WeightToInput,
        Opcode::SumsiToOut,
    ];

    /// Stable wire code used in the genepool text format
    pub const fn code(&self) -> u8 {
        match self {
            Opcode::NewWeight => 1,
            Opcode::NewSumsi => 2,
            Opcode::SumsiToWeightIn => 3,
            Opcode::SumsiToWeightCtrl => 4,
            Opcode::WeightToSumsiIn => 5,
            Opcode::WeightToWeightCtrl => 6,
            Opcode::PopWeight => 7,
            Opcode::PopSumsi => 8,
            Opcode::WeightToInput => 9,
            Opcode::SumsiToOut => 10,
        }
    }

    /// Decode a wire code
    pub fn from_code(code: u8) -> Result<Self> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.code() == code)
            .ok_or(GenomeError::UnknownOpcode { code })
    }

    /// Whether the builder reads this opcode's argument
    pub const fn takes_arg(&self) -> bool {
        !matches!(
            self,
            Opcode::NewSumsi | Opcode::PopWeight | Opcode::PopSumsi | Opcode::SumsiToOut
        )
    }

    /// The randomness sentinel this opcode's argument may carry, if any
    ///
    /// Only the stack-indexing connection opcodes accept sentinels; on
    /// `NEW_WEIGHT` the same negative values are ordinary weight literals.
    pub const fn rand_sentinel(&self) -> Option<i32> {
        match self {
            Opcode::SumsiToWeightIn | Opcode::SumsiToWeightCtrl | Opcode::WeightToWeightCtrl => {
                Some(ARG_RAND_WEIGHT)
            }
            Opcode::WeightToSumsiIn => Some(ARG_RAND_SUMSI),
            _ => None,
        }
    }

    /// Short mnemonic used in human-readable pool dumps
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::NewWeight => "NW",
            Opcode::NewSumsi => "NS",
            Opcode::SumsiToWeightIn => "SWI",
            Opcode::SumsiToWeightCtrl => "SWC",
            Opcode::WeightToSumsiIn => "WSI",
            Opcode::WeightToWeightCtrl => "WWC",
            Opcode::PopWeight => "PW",
            Opcode::PopSumsi => "PS",
            Opcode::WeightToInput => "WIN",
            Opcode::SumsiToOut => "OUT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One tape cell: an opcode and its argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// The opcode
    pub op: Opcode,
    /// The argument; [`ARG_NONE`] when unused, [`ARG_RAND_WEIGHT`] /
    /// [`ARG_RAND_SUMSI`] when awaiting resolution
    pub arg: i32,
}

impl Command {
    /// Create a new command
    pub const fn new(op: Opcode, arg: i32) -> Self {
        Self { op, arg }
    }

    /// Whether this command still carries an unresolved randomness sentinel
    pub const fn is_unresolved(&self) -> bool {
        match self.op.rand_sentinel() {
            Some(sentinel) => self.arg == sentinel,
            None => false,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.op.takes_arg() {
            return write!(f, "{}", self.op);
        }
        if self.is_unresolved() {
            let tag = if self.arg == ARG_RAND_WEIGHT { "rw" } else { "rs" };
            return write!(f, "{}:{}", self.op, tag);
        }
        write!(f, "{}:{}", self.op, self.arg)
    }
}

/// A genome: the command tape plus the two evolvable hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    /// The command tape
    pub commands: Vec<Command>,
    /// Learning rate applied in the control-update pass, in (0, 1]
    pub learning_rate: f32,
    /// Number of runtime steps granted per question (kept fractional so
    /// mutation can scale it smoothly; the evaluator truncates)
    pub thinking_time: f32,
}

impl Genome {
    /// Create a genome from parts
    pub fn new(commands: Vec<Command>, learning_rate: f32, thinking_time: f32) -> Self {
        Self {
            commands,
            learning_rate,
            thinking_time,
        }
    }

    /// The seed program every fresh pool starts from
    ///
    /// Wires the bias input through the sentinel weight unit into the
    /// sentinel sumsi, and designates that sumsi as the output.
    pub fn seed() -> Self {
        Self {
            commands: vec![
                Command::new(Opcode::WeightToInput, (NUM_INPUTS - 1) as i32),
                Command::new(Opcode::WeightToSumsiIn, 0),
                Command::new(Opcode::SumsiToOut, ARG_NONE),
            ],
            learning_rate: 0.8,
            thinking_time: 40.0,
        }
    }

    /// Number of commands on the tape
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the tape is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether any command still carries an unresolved randomness sentinel
    pub fn has_unresolved_args(&self) -> bool {
        self.commands.iter().any(Command::is_unresolved)
    }

    /// Check the genome invariants
    pub fn validate(&self) -> Result<()> {
        if self.commands.len() > MAX_GENES {
            return Err(GenomeError::TooManyGenes {
                count: self.commands.len(),
                max: MAX_GENES,
            });
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(GenomeError::InvalidHyperparameter {
                name: "learning_rate",
                value: self.learning_rate,
                constraint: "in (0, 1]",
            });
        }
        if self.thinking_time < MIN_THINKING_TIME {
            return Err(GenomeError::InvalidHyperparameter {
                name: "thinking_time",
                value: self.thinking_time,
                constraint: ">= MIN_THINKING_TIME",
            });
        }
        Ok(())
    }

    /// One-line human-readable summary
    ///
    /// Capped so that even with the pool writer's slot prefix the comment
    /// line stays under the 100-character read limit.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "lr={:.6} tt={:.1} len={}",
            self.learning_rate,
            self.thinking_time,
            self.commands.len()
        );
        for cmd in &self.commands {
            let piece = format!(" {}", cmd);
            if line.len() + piece.len() > 80 {
                line.push_str(" ..");
                break;
            }
            line.push_str(&piece);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_codes_roundtrip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_code(op.code()).unwrap(), op);
        }
        assert!(Opcode::from_code(0).is_err());
        assert!(Opcode::from_code(11).is_err());
    }

    #[test]
    fn test_seed_genome_shape() {
        let genome = Genome::seed();
        assert_eq!(genome.len(), 3);
        assert_eq!(
            genome.commands[0],
            Command::new(Opcode::WeightToInput, 8)
        );
        assert_eq!(
            genome.commands[1],
            Command::new(Opcode::WeightToSumsiIn, 0)
        );
        assert_eq!(
            genome.commands[2],
            Command::new(Opcode::SumsiToOut, ARG_NONE)
        );
        assert_eq!(genome.learning_rate, 0.8);
        assert_eq!(genome.thinking_time, 40.0);
        assert!(genome.validate().is_ok());
        assert!(!genome.has_unresolved_args());
    }

    #[test]
    fn test_validate_rejects_bad_hyperparameters() {
        let mut genome = Genome::seed();
        genome.learning_rate = 0.0;
        assert!(genome.validate().is_err());

        let mut genome = Genome::seed();
        genome.learning_rate = 1.5;
        assert!(genome.validate().is_err());

        let mut genome = Genome::seed();
        genome.thinking_time = 1.0;
        assert!(genome.validate().is_err());
    }

    #[test]
    fn test_unresolved_detection() {
        let mut genome = Genome::seed();
        assert!(!genome.has_unresolved_args());
        genome
            .commands
            .push(Command::new(Opcode::SumsiToWeightIn, ARG_RAND_WEIGHT));
        assert!(genome.has_unresolved_args());
    }

    #[test]
    fn test_negative_weight_literals_are_not_sentinels() {
        // NEW_WEIGHT's argument range overlaps the sentinel values; they are
        // ordinary hundredth-weights there.
        let cmd = Command::new(Opcode::NewWeight, ARG_RAND_WEIGHT);
        assert!(!cmd.is_unresolved());
        assert_eq!(format!("{}", cmd), "NW:-2");

        let cmd = Command::new(Opcode::WeightToSumsiIn, ARG_RAND_SUMSI);
        assert!(cmd.is_unresolved());
        assert_eq!(format!("{}", cmd), "WSI:rs");
    }

    #[test]
    fn test_summary_stays_under_line_cap() {
        let mut genome = Genome::seed();
        for _ in 0..200 {
            genome
                .commands
                .push(Command::new(Opcode::NewWeight, -100));
        }
        // Leave headroom for the pool writer's "# [nnn] " prefix.
        assert!(genome.summary().len() <= 85);
    }
}
