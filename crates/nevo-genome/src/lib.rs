//! Gene programs and genepool persistence for the nevo neuroevolution engine
//!
//! A genome is a linear tape of (opcode, argument) commands plus two scalar
//! hyperparameters. Executing the tape on the brain-construction stack machine
//! (see `nevo-brain`) materialises a network of weight units and sumsi units.
//! This crate owns the tape representation, the dense unit identifiers shared
//! across the workspace, and the text formats used for the on-disk genepool
//! and the peer-exchange file.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ids;
pub mod io;
pub mod program;

pub use error::{GenomeError, Result};
pub use ids::{SumsiId, WeightId};
pub use io::{
    read_exchange, read_genome_block, read_pool, write_exchange, write_genome_block, write_pool,
};
pub use program::{
    Command, Genome, Opcode, ARG_NONE, ARG_RAND_SUMSI, ARG_RAND_WEIGHT, MAX_GENES,
    MIN_THINKING_TIME, NUM_INPUTS,
};
